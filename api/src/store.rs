use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Coach, Game, ImportedTeamStats, ParsedPage, Player, Program, Sport, TeamInfo, WinLossStats};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Full program re-import: the program's games and people are replaced.
    Resync,
    /// Additive import: existing games and names are kept, only new ones added.
    #[default]
    Merge,
}

impl std::str::FromStr for ImportMode {
    type Err = crate::UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resync" | "replace" => Ok(ImportMode::Resync),
            "merge" | "add" => Ok(ImportMode::Merge),
            _ => Err(crate::UnknownValue { kind: "import mode", value: s.to_owned() }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub games_added: usize,
    pub games_removed: usize,
    pub games_skipped: usize,
    pub players_added: usize,
    pub players_removed: usize,
    pub players_skipped: usize,
    pub coaches_added: usize,
    pub coaches_removed: usize,
    pub coaches_skipped: usize,
    pub team_info_replaced: bool,
    pub stats_replaced: bool,
}

/// In-memory team store: the receiving end of an import.
///
/// Parsed records arrive with throwaway IDs; the store assigns permanent ones
/// and decides whether an import replaces or extends what it already holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamStore {
    pub games: Vec<Game>,
    pub players: Vec<Player>,
    pub coaches: Vec<Coach>,
    pub team_info: HashMap<Sport, TeamInfo>,
    pub imported_stats: HashMap<String, ImportedTeamStats>,
    next_id: u64,
}

impl TeamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store saved with [`TeamStore::save`]. A missing file is an empty store.
    pub fn load(path: &Path) -> io::Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write pretty JSON to a sibling temp file, then swap it into place.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)
    }

    pub fn games_for(&self, program: &Program) -> impl Iterator<Item = &Game> {
        let program = *program;
        self.games.iter().filter(move |g| g.program() == program)
    }

    pub fn players_for<'a>(&'a self, program: &Program) -> impl Iterator<Item = &'a Player> {
        let key = program.key();
        self.players.iter().filter(move |p| p.program_key == key)
    }

    pub fn coaches_for<'a>(&'a self, program: &Program) -> impl Iterator<Item = &'a Coach> {
        let key = program.key();
        self.coaches.iter().filter(move |c| c.program_key == key)
    }

    /// Win/loss tally from the program's own game results. Independent of any
    /// imported stats block; results have no tie form, so ties stay 0.
    pub fn computed_record(&self, program: &Program) -> WinLossStats {
        let (wins, losses) = self
            .games_for(program)
            .filter_map(|g| g.result.as_ref())
            .fold((0u32, 0u32), |(w, l), r| if r.won { (w + 1, l) } else { (w, l + 1) });
        let played = wins + losses;
        let pct = if played == 0 { 0.0 } else { f64::from(wins) / f64::from(played) };
        WinLossStats { wins, losses, ties: 0, pct }
    }

    /// Persist one parse for `program`.
    pub fn apply(&mut self, parsed: ParsedPage, program: &Program, mode: ImportMode) -> ImportSummary {
        let key = program.key();
        let mut summary = ImportSummary::default();

        if mode == ImportMode::Resync {
            summary.games_removed = drain_where(&mut self.games, |g| g.program() == *program);
            summary.players_removed = drain_where(&mut self.players, |p| p.program_key == key);
            summary.coaches_removed = drain_where(&mut self.coaches, |c| c.program_key == key);
        }

        let mut game_keys: HashSet<GameKey> =
            self.games_for(program).map(GameKey::of).collect();
        for mut game in parsed.games {
            game.sport = program.sport;
            game.gender = program.gender;
            game.level = program.level;
            if !game_keys.insert(GameKey::of(&game)) {
                summary.games_skipped += 1;
                continue;
            }
            game.id = self.next_id("g");
            self.games.push(game);
            summary.games_added += 1;
        }

        let mut names: HashSet<String> =
            self.players_for(program).map(|p| p.name.to_lowercase()).collect();
        for mut player in parsed.players {
            if !names.insert(player.name.to_lowercase()) {
                summary.players_skipped += 1;
                continue;
            }
            player.id = self.next_id("p");
            player.program_key = key.clone();
            self.players.push(player);
            summary.players_added += 1;
        }

        let mut names: HashSet<String> =
            self.coaches_for(program).map(|c| c.name.to_lowercase()).collect();
        for mut coach in parsed.coaches {
            if !names.insert(coach.name.to_lowercase()) {
                summary.coaches_skipped += 1;
                continue;
            }
            coach.id = self.next_id("c");
            coach.program_key = key.clone();
            self.coaches.push(coach);
            summary.coaches_added += 1;
        }

        if let Some(info) = parsed.team_info {
            self.team_info.insert(info.sport, info);
            summary.team_info_replaced = true;
        }
        if let Some(stats) = parsed.imported_stats {
            self.imported_stats.insert(key, stats);
            summary.stats_replaced = true;
        }

        log::debug!("applied {mode:?} import for {}: {summary:?}", program.key());
        summary
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// Identity of a game for additive imports.
#[derive(Debug, PartialEq, Eq, Hash)]
struct GameKey {
    date: chrono::NaiveDate,
    opponent: Option<String>,
    title: Option<String>,
}

impl GameKey {
    fn of(game: &Game) -> Self {
        Self {
            date: game.date,
            opponent: game.opponent.as_ref().map(|o| o.to_lowercase()),
            title: game.title.as_ref().map(|t| t.to_lowercase()),
        }
    }
}

fn drain_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|item| !pred(item));
    before - items.len()
}
