use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::extract::{FieldRules, Source, absolute_image_url, clean_text};
use crate::text::{
    outcome_from_marker, parse_date, parse_result, parse_score, parse_venue, strip_class_year,
    strip_label,
};
use crate::{
    Coach, CoachRole, Game, GameResult, ImportedTeamStats, ParsedPage, Player, Program,
    ProgramContext, RosterRole, Sport, TeamInfo, WinLossStats,
};

// ---------------------------------------------------------------------------
// Candidate selectors, most specific template revision first
// ---------------------------------------------------------------------------

static TEAM_NAME: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("team name", &[".team-name", ".fsAthleticsTeamName", ".team-title"])
});
static TEAM_SEASON: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("season", &[".team-schoolyear", ".team-season", ".fsAthleticsSeason"])
});
static TEAM_HEAD_COACH: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("head coach", &[".team-headcoach", ".team-coach", ".fsAthleticsCoach"])
});

static GAME_ROWS: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("game row", &[".game", ".schedule-game", ".fsAthleticsEvent"])
});
static GAME_DATE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("game date", &[".schedule-date", ".fsDate", "time"])
});
static GAME_TIME: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("game time", &[".schedule-time", ".fsTime"])
});
static GAME_SITE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("venue", &[".schedule-site", ".fsAthleticsAdvantage"])
});
static GAME_OPPONENT: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("opponent", &[".schedule-opponent", ".fsAthleticsOpponentName", ".opponent"])
});
static GAME_LOCATION: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("location", &[".schedule-location", ".fsAthleticsLocations", ".location"])
});
static GAME_LEAGUE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("league marker", &[".league-status", ".fsAthleticsLeague", ".league-game"])
});
static GAME_TITLE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("title", &[".schedule-title", ".fsAthleticsEventTitle"])
});
static GAME_OUTCOME: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("outcome marker", &[".winloss", ".fsAthleticsResult", ".outcome"])
});
static GAME_SCORE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("score", &[".score", ".fsAthleticsScore"])
});
static GAME_RESULT_TEXT: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("result text", &[".schedule-result", ".result"])
});

static ROSTER_CONTAINER: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("roster", &[".roster", ".team-roster", ".fsAthleticsRoster", "#roster"])
});
static ROSTER_CARDS: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("roster card", &[".roster-card", ".roster-player", ".roster-list li"])
});
static CARD_NAME: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("player name", &[".roster-name", ".player-name", ".name", "h3", "h4"])
});
static CARD_NUMBER: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("jersey", &[".roster-number", ".jersey", ".number"])
});
static CARD_POSITION: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("position", &[".roster-position", ".position"])
});
static CARD_HOMETOWN: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("hometown", &[".roster-hometown", ".hometown"])
});
static ROSTER_TABLE_ROWS: LazyLock<FieldRules> =
    LazyLock::new(|| FieldRules::text("roster row", &["table tr"]));

static COACH_CARDS: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("coach card", &[".coach-card", ".roster-coaches li", ".coaches li"])
});
static COACH_NAME: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("coach name", &[".coach-name", ".name", "h3", "h4"])
});
static COACH_TITLE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("coach title", &[".coach-title", ".title", ".position"])
});

static AVATAR_CARDS: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("avatar card", &[".fsConstituentItem", ".directory-card", ".avatar-card"])
});
static AVATAR_NAME: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::new(
        "avatar name",
        &[
            (".fsFullName", Source::Text),
            (".avatar-name", Source::Text),
            (".directory-name", Source::Text),
            ("img[alt]", Source::Attr("alt")),
            ("[title]", Source::Attr("title")),
        ],
    )
});
static PHOTO: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::new("photo", &[("img", Source::Attr("data-src")), ("img", Source::Attr("src"))])
});
static EMAIL: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::new("email", &[("a[href^='mailto:']", Source::Attr("href"))])
});
static PHONE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::new("phone", &[("a[href^='tel:']", Source::Attr("href"))])
});

static STATS_CONTAINER: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text(
        "stats",
        &[".team-stats", ".fsAthleticsTeamStats", ".win-loss-stats", "#team-stats"],
    )
});
static STATS_OVERALL: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("overall stats", &[".overall", ".stats-overall", ".fsOverall"])
});
static STATS_LEAGUE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text("league stats", &[".league", ".stats-league", ".fsLeague"])
});
static STATS_NON_LEAGUE: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::text(
        "non-league stats",
        &[".non-league", ".nonleague", ".stats-non-league", ".fsNonLeague"],
    )
});
static STAT_VALUES: LazyLock<FieldRules> =
    LazyLock::new(|| FieldRules::text("stat values", &[".stat-value", ".value"]));

static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("invalid selector: td"));
static TH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").expect("invalid selector: th"));

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse a team page into games, roster and stats for `sport`.
///
/// Team info and games, roster, and stats are read by independent passes. A
/// record that can't be read is dropped on its own; the rest of the page
/// still comes through.
///
/// `context` tags the records with gender/level; boys varsity when absent.
/// Defined for every input string: markup that isn't a team page (or isn't
/// HTML at all) yields an empty [`ParsedPage`].
pub fn parse_page(html: &str, sport: Sport, context: Option<ProgramContext>) -> ParsedPage {
    let program = context.unwrap_or_default().program(sport);
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let team_info = parse_team_info(root, sport);
    let games = parse_games(root, &program);

    let mut roster = Roster::new(program);
    if let Some(head_coach) = team_info.as_ref().and_then(|t| t.head_coach.clone()) {
        roster.add_coach(CoachEntry { name: head_coach, role: CoachRole::Head, ..Default::default() });
    }
    collect_roster(root, &mut roster);
    collect_coaches(root, &mut roster);
    attach_avatar_photos(root, &mut roster);

    let imported_stats = parse_stats(root);

    log::debug!(
        "parsed {} page: {} games, {} players, {} coaches, stats={}",
        program.key(),
        games.len(),
        roster.players.len(),
        roster.coaches.len(),
        imported_stats.is_some()
    );

    ParsedPage {
        team_info,
        games,
        players: roster.players,
        coaches: roster.coaches,
        imported_stats,
    }
}

// ---------------------------------------------------------------------------
// Team info + games
// ---------------------------------------------------------------------------

fn parse_team_info(root: ElementRef<'_>, sport: Sport) -> Option<TeamInfo> {
    let name = TEAM_NAME.value(root)?;
    let head_coach = TEAM_HEAD_COACH
        .value(root)
        .map(|text| strip_label(&text, "Head Coach:").to_owned())
        .filter(|name| !name.is_empty());
    Some(TeamInfo {
        name,
        sport,
        season: TEAM_SEASON.value(root).unwrap_or_default(),
        head_coach,
    })
}

fn parse_games(root: ElementRef<'_>, program: &Program) -> Vec<Game> {
    let key = program.key();
    let mut games = Vec::new();
    for (index, row) in GAME_ROWS.all(root).into_iter().enumerate() {
        match parse_game(row, program) {
            Some(mut game) => {
                game.id = format!("{key}-game-{}", games.len() + 1);
                games.push(game);
            }
            None => log::debug!("skipping {} #{index}: no parseable date", GAME_ROWS.field()),
        }
    }
    games
}

fn parse_game(row: ElementRef<'_>, program: &Program) -> Option<Game> {
    // Some templates put date and time in two sibling date spans.
    let dates = GAME_DATE.values(row);
    let date = parse_date(dates.first()?)?;
    let time = dates.get(1).cloned().or_else(|| GAME_TIME.value(row));

    Some(Game {
        id: String::new(),
        sport: program.sport,
        gender: program.gender,
        level: program.level,
        date,
        time,
        opponent: GAME_OPPONENT.value(row),
        venue: GAME_SITE.value(row).map(|s| parse_venue(&s)).unwrap_or_default(),
        location: GAME_LOCATION.value(row),
        is_league: GAME_LEAGUE.present(row),
        title: GAME_TITLE.value(row),
        result: parse_game_result(row),
    })
}

/// Structural marker first; free-text scan only when the row has no marker.
fn parse_game_result(row: ElementRef<'_>) -> Option<GameResult> {
    match GAME_OUTCOME.first(row) {
        Some(marker) => {
            let marker_text = clean_text(marker);
            let outcome = outcome_from_marker(marker.value().classes(), &marker_text)?;
            let score = GAME_SCORE
                .value(row)
                .and_then(|s| parse_score(&s))
                .or_else(|| parse_score(&marker_text))?;
            Some(GameResult { won: outcome.won(), score })
        }
        None => {
            let text = GAME_RESULT_TEXT
                .first(row)
                .map(clean_text)
                .unwrap_or_else(|| clean_text(row));
            parse_result(&text)
        }
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RosterEntry {
    name: String,
    number: Option<String>,
    position: Option<String>,
    hometown: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    photo: Option<String>,
}

#[derive(Debug, Default)]
struct CoachEntry {
    name: String,
    role: CoachRole,
    email: Option<String>,
    phone: Option<String>,
    photo: Option<String>,
}

/// Accumulates people for one program; names are unique case-insensitively
/// and the first entry seen for a name wins.
struct Roster {
    program: Program,
    key: String,
    players: Vec<Player>,
    coaches: Vec<Coach>,
    player_names: HashSet<String>,
    coach_names: HashSet<String>,
}

impl Roster {
    fn new(program: Program) -> Self {
        Self {
            key: program.key(),
            program,
            players: Vec::new(),
            coaches: Vec::new(),
            player_names: HashSet::new(),
            coach_names: HashSet::new(),
        }
    }

    /// Route an entry by its position text: coaches go to the staff list,
    /// managers are players with the manager role.
    fn add_entry(&mut self, entry: RosterEntry) {
        let position = entry.position.as_deref().unwrap_or("").to_lowercase();
        if position.contains("coach") {
            let role = CoachRole::from_title(&position);
            self.add_coach(CoachEntry {
                name: entry.name,
                role,
                email: entry.email,
                phone: entry.phone,
                photo: entry.photo,
            });
            return;
        }

        if !self.player_names.insert(entry.name.to_lowercase()) {
            log::debug!("duplicate roster entry for {:?}", entry.name);
            return;
        }
        let roster_role = if position.contains("manager") {
            RosterRole::Manager
        } else {
            RosterRole::Player
        };
        self.players.push(Player {
            id: format!("{}-player-{}", self.key, self.players.len() + 1),
            name: entry.name,
            jersey_number: entry.number.map(|n| n.trim_start_matches('#').to_owned()),
            position: entry.position,
            hometown: entry.hometown,
            email: entry.email,
            phone: entry.phone,
            photo: entry.photo,
            roster_role,
            sports: vec![self.program.sport],
            program_key: self.key.clone(),
        });
    }

    fn add_coach(&mut self, entry: CoachEntry) {
        if !self.coach_names.insert(entry.name.to_lowercase()) {
            return;
        }
        self.coaches.push(Coach {
            id: format!("{}-coach-{}", self.key, self.coaches.len() + 1),
            name: entry.name,
            role: entry.role,
            email: entry.email,
            phone: entry.phone,
            photo: entry.photo,
            sports: vec![self.program.sport],
            program_key: self.key.clone(),
        });
    }

    /// Fill a missing photo on an already-known person. Never creates one.
    fn attach_photo(&mut self, name: &str, photo: &str) {
        let wanted = name.to_lowercase();
        if let Some(player) = self.players.iter_mut().find(|p| p.name.to_lowercase() == wanted) {
            player.photo.get_or_insert_with(|| photo.to_owned());
        } else if let Some(coach) = self.coaches.iter_mut().find(|c| c.name.to_lowercase() == wanted) {
            coach.photo.get_or_insert_with(|| photo.to_owned());
        }
    }
}

fn collect_roster(root: ElementRef<'_>, roster: &mut Roster) {
    let Some(container) = ROSTER_CONTAINER.first(root) else {
        return;
    };

    // Card/list shape: name + hometown, sometimes number and position.
    for card in ROSTER_CARDS.all(container) {
        let Some(name) = CARD_NAME.value(card) else {
            log::debug!("skipping {} without a name", ROSTER_CARDS.field());
            continue;
        };
        roster.add_entry(RosterEntry {
            name,
            number: CARD_NUMBER.value(card),
            position: CARD_POSITION.value(card),
            hometown: CARD_HOMETOWN.value(card),
            email: mail_address(card),
            phone: phone_number(card),
            photo: PHOTO.value(card).map(|src| absolute_image_url(&src)),
        });
    }

    // Tabular shape: name + number + position.
    let mut columns: Option<Columns> = None;
    for row in ROSTER_TABLE_ROWS.all(container) {
        let headers: Vec<String> = row.select(&TH).map(clean_text).collect();
        if !headers.is_empty() {
            columns = Columns::from_headers(&headers);
            continue;
        }
        let cells: Vec<String> = row.select(&TD).map(clean_text).collect();
        if cells.is_empty() {
            continue;
        }
        let cols = columns.unwrap_or_else(|| Columns::headerless(cells.len()));
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| cells.get(i))
                .filter(|text| !text.is_empty())
                .cloned()
        };
        let Some(name) = cell(Some(cols.name)) else {
            log::debug!("skipping roster table row without a name");
            continue;
        };
        roster.add_entry(RosterEntry {
            name,
            number: cell(cols.number),
            position: cell(cols.position),
            hometown: cell(cols.hometown),
            email: mail_address(row),
            phone: phone_number(row),
            photo: None,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    name: usize,
    number: Option<usize>,
    position: Option<usize>,
    hometown: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &[String]) -> Option<Self> {
        let find = |pred: &dyn Fn(&str) -> bool| {
            headers.iter().position(|h| pred(h.to_lowercase().trim_end_matches('.')))
        };
        Some(Self {
            name: find(&|h: &str| h.contains("name"))?,
            number: find(&|h: &str| matches!(h, "#" | "no" | "num") || h.contains("number") || h.contains("jersey")),
            position: find(&|h: &str| h.starts_with("pos")),
            hometown: find(&|h: &str| h.contains("hometown") || h.contains("home town")),
        })
    }

    /// Without headers the template's column order is `#, name, position`.
    fn headerless(width: usize) -> Self {
        if width < 2 {
            return Self { name: 0, number: None, position: None, hometown: None };
        }
        Self {
            name: 1,
            number: Some(0),
            position: (width > 2).then_some(2),
            hometown: None,
        }
    }
}

fn collect_coaches(root: ElementRef<'_>, roster: &mut Roster) {
    for card in COACH_CARDS.all(root) {
        let Some(name) = COACH_NAME.value(card) else {
            continue;
        };
        let role = COACH_TITLE
            .value(card)
            .map(|title| CoachRole::from_title(&title))
            .unwrap_or_default();
        roster.add_coach(CoachEntry {
            name,
            role,
            email: mail_address(card),
            phone: phone_number(card),
            photo: PHOTO.value(card).map(|src| absolute_image_url(&src)),
        });
    }
}

/// Directory/avatar cards only carry a name and a photo. They decorate
/// people the textual roster already produced.
fn attach_avatar_photos(root: ElementRef<'_>, roster: &mut Roster) {
    for card in AVATAR_CARDS.all(root) {
        let (Some(name), Some(src)) = (AVATAR_NAME.value(card), PHOTO.value(card)) else {
            continue;
        };
        roster.attach_photo(strip_class_year(&name), &absolute_image_url(&src));
    }
}

fn mail_address(scope: ElementRef<'_>) -> Option<String> {
    EMAIL
        .value(scope)
        .and_then(|href| href.strip_prefix("mailto:").map(|s| s.split('?').next().unwrap_or(s).to_owned()))
        .filter(|s| !s.is_empty())
}

fn phone_number(scope: ElementRef<'_>) -> Option<String> {
    PHONE
        .value(scope)
        .and_then(|href| href.strip_prefix("tel:").map(str::to_owned))
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Statistics block
// ---------------------------------------------------------------------------

fn parse_stats(root: ElementRef<'_>) -> Option<ImportedTeamStats> {
    let container = STATS_CONTAINER.first(root)?;

    let mut overall = sub_block(&STATS_OVERALL, container);
    let mut league = sub_block(&STATS_LEAGUE, container);
    let mut non_league = sub_block(&STATS_NON_LEAGUE, container);

    // Single-table layout: one labelled row per split.
    if overall.is_none() && league.is_none() && non_league.is_none() {
        for row in container.select(&TR) {
            let cells: Vec<String> = row.select(&TD).map(clean_text).collect();
            if cells.len() < 5 {
                continue;
            }
            let values = [cells[1].clone(), cells[2].clone(), cells[3].clone(), cells[4].clone()];
            match cells[0].to_lowercase().trim_end_matches(':') {
                "overall" => overall = Some(values),
                "league" => league = Some(values),
                "non-league" | "nonleague" | "non league" => non_league = Some(values),
                _ => {}
            }
        }
    }

    let stats = ImportedTeamStats {
        overall: overall.as_ref().and_then(parse_stat_line),
        league: league.as_ref().and_then(parse_stat_line),
        non_league: non_league.as_ref().and_then(parse_stat_line),
    };
    (!stats.is_empty()).then_some(stats)
}

fn sub_block(rules: &FieldRules, container: ElementRef<'_>) -> Option<[String; 4]> {
    rules.first(container).and_then(block_cells)
}

/// The four data cells of a sub-block: first table row with at least four
/// `td`s, else the first four stat-value elements.
fn block_cells(block: ElementRef<'_>) -> Option<[String; 4]> {
    let from_table = block.select(&TR).find_map(|row| {
        let mut cells: Vec<String> = row.select(&TD).map(clean_text).collect();
        // Leading row label ("Overall").
        if cells.len() > 4 && !cells[0].bytes().any(|b| b.is_ascii_digit()) {
            cells.remove(0);
        }
        first_four(cells)
    });
    from_table.or_else(|| first_four(STAT_VALUES.values(block)))
}

fn first_four(cells: Vec<String>) -> Option<[String; 4]> {
    let mut it = cells.into_iter();
    Some([it.next()?, it.next()?, it.next()?, it.next()?])
}

fn parse_stat_line(cells: &[String; 4]) -> Option<WinLossStats> {
    let line = WinLossStats {
        wins: cells[0].trim().parse().ok()?,
        losses: cells[1].trim().parse().ok()?,
        ties: cells[2].trim().parse().ok()?,
        pct: parse_pct(&cells[3])?,
    };
    Some(line)
}

/// ".750", "0.750" or "75%".
fn parse_pct(text: &str) -> Option<f64> {
    let text = text.trim();
    let value = match text.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0,
        None => text.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Gender, Level, Venue};
    use chrono::NaiveDate;

    fn page(body: &str) -> String {
        format!("<html><body>{body}</body></html>")
    }

    fn game_row(date: &str, extra: &str) -> String {
        format!(r#"<div class="game"><span class="schedule-date">{date}</span>{extra}</div>"#)
    }

    #[test]
    fn team_info_seeds_head_coach() {
        let html = page(
            r#"<h1 class="team-name">Varsity Boys Soccer</h1>
               <div class="team-schoolyear">2025 - 2026</div>
               <div class="team-headcoach">Head Coach: Pat Smith</div>"#,
        );
        let parsed = parse_page(&html, Sport::Soccer, None);
        let info = parsed.team_info.unwrap();
        assert_eq!(info.name, "Varsity Boys Soccer");
        assert_eq!(info.season, "2025 - 2026");
        assert_eq!(info.head_coach.as_deref(), Some("Pat Smith"));
        assert_eq!(parsed.coaches.len(), 1);
        assert_eq!(parsed.coaches[0].role, CoachRole::Head);
        assert_eq!(parsed.coaches[0].program_key, "soccer_boys_varsity");
    }

    #[test]
    fn no_team_name_means_no_team_info() {
        let html = page(r#"<div class="team-schoolyear">2025 - 2026</div>"#);
        assert_eq!(parse_page(&html, Sport::Soccer, None).team_info, None);
    }

    #[test]
    fn bad_date_row_is_dropped_alone() {
        let html = page(&[
            game_row("Thursday, 2/19/2026", ""),
            game_row("Friday, 2/20/2026", ""),
            game_row("TBA", ""),
            game_row("Saturday, 2/21/2026", ""),
        ]
        .concat());
        let parsed = parse_page(&html, Sport::Tennis, None);
        assert_eq!(parsed.games.len(), 3);
        let days: Vec<u32> = parsed.games.iter().map(|g| chrono::Datelike::day(&g.date)).collect();
        assert_eq!(days, vec![19, 20, 21]);
        assert_eq!(parsed.games[2].id, "tennis_boys_varsity-game-3");
    }

    #[test]
    fn game_fields_and_defaults() {
        let html = page(&[
            game_row(
                "Thursday, 2/19/2026",
                r#"<span class="schedule-date">4:00 PM</span>
                   <span class="schedule-site">Away</span>
                   <span class="schedule-opponent">Central High</span>
                   <span class="schedule-location">Central Field</span>
                   <span class="league-status"></span>
                   <span class="schedule-title">CIF Quarterfinal</span>"#,
            ),
            game_row("3/1/2026", r#"<span class="schedule-opponent">East</span>"#),
        ]
        .concat());
        let ctx = ProgramContext { gender: Gender::Girls, level: Level::Jv };
        let parsed = parse_page(&html, Sport::Soccer, Some(ctx));

        let first = &parsed.games[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 2, 19).unwrap());
        assert_eq!(first.time.as_deref(), Some("4:00 PM"));
        assert_eq!(first.venue, Venue::Away);
        assert_eq!(first.opponent.as_deref(), Some("Central High"));
        assert_eq!(first.location.as_deref(), Some("Central Field"));
        assert!(first.is_league);
        assert_eq!(first.title.as_deref(), Some("CIF Quarterfinal"));
        assert_eq!(first.gender, Gender::Girls);
        assert_eq!(first.level, Level::Jv);

        let second = &parsed.games[1];
        assert_eq!(second.venue, Venue::Home);
        assert!(!second.is_league);
        assert_eq!(second.time, None);
        assert_eq!(second.location, None);
    }

    #[test]
    fn result_from_marker_and_score() {
        let html = page(&[
            game_row("2/19/2026", r#"<span class="winloss">W</span><span class="score">3 – 2</span>"#),
            game_row("2/20/2026", r#"<span class="winloss loss"></span><span class="score">0-1</span>"#),
        ]
        .concat());
        let parsed = parse_page(&html, Sport::Soccer, None);
        assert_eq!(
            parsed.games[0].result,
            Some(GameResult { won: true, score: "3-2".into() })
        );
        assert_eq!(
            parsed.games[1].result,
            Some(GameResult { won: false, score: "0-1".into() })
        );
    }

    #[test]
    fn marker_without_score_is_no_result() {
        let html = page(&game_row("2/19/2026", r#"<span class="winloss">W</span>"#));
        assert_eq!(parse_page(&html, Sport::Soccer, None).games[0].result, None);
    }

    #[test]
    fn score_without_marker_signal_is_no_result() {
        let html = page(&game_row(
            "2/19/2026",
            r#"<span class="winloss">Final</span><span class="score">3-2</span>"#,
        ));
        assert_eq!(parse_page(&html, Sport::Soccer, None).games[0].result, None);
    }

    #[test]
    fn conflicting_marker_signals_mean_loss() {
        let html = page(&game_row(
            "2/19/2026",
            r#"<span class="winloss win">L</span><span class="score">2-2</span>"#,
        ));
        let result = parse_page(&html, Sport::Soccer, None).games[0].result.clone();
        assert_eq!(result, Some(GameResult { won: false, score: "2-2".into() }));
    }

    #[test]
    fn free_text_result_only_without_marker() {
        let html = page(&game_row(
            "2/19/2026",
            r#"<span class="schedule-result">Win 5-1</span>"#,
        ));
        let result = parse_page(&html, Sport::Soccer, None).games[0].result.clone();
        assert_eq!(result, Some(GameResult { won: true, score: "5-1".into() }));
    }

    #[test]
    fn free_text_ignores_initials_and_location_digits() {
        let html = page(&[
            game_row(
                "2/19/2026",
                r#"<span class="schedule-opponent">L.A. Baptist</span>
                   <span class="schedule-location">Field 1-2</span>"#,
            ),
            game_row(
                "2/20/2026",
                r#"<span class="schedule-opponent">L.A. Baptist</span>
                   <span class="schedule-result">W 3-2</span>"#,
            ),
        ]
        .concat());
        let games = parse_page(&html, Sport::Soccer, None).games;
        assert_eq!(games[0].result, None);
        assert_eq!(games[1].result, Some(GameResult { won: true, score: "3-2".into() }));
    }

    #[test]
    fn card_and_table_entries_dedupe_by_name() {
        let html = page(
            r#"<div class="roster">
                 <ul class="roster-list">
                   <li><span class="roster-name">Alex Kim</span><span class="roster-hometown">Claremont</span></li>
                   <li><span class="roster-name">Sam Lee</span></li>
                   <li><span class="roster-hometown">No name here</span></li>
                 </ul>
                 <table>
                   <tr><th>No.</th><th>Name</th><th>Position</th></tr>
                   <tr><td>7</td><td>ALEX KIM</td><td>Forward</td></tr>
                   <tr><td>12</td><td>Jo Park</td><td>Team Manager</td></tr>
                   <tr><td>3</td><td></td><td>Defense</td></tr>
                 </table>
               </div>"#,
        );
        let parsed = parse_page(&html, Sport::Soccer, None);
        let names: Vec<&str> = parsed.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alex Kim", "Sam Lee", "Jo Park"]);

        let alex = &parsed.players[0];
        assert_eq!(alex.hometown.as_deref(), Some("Claremont"));
        assert_eq!(alex.jersey_number, None);

        let jo = &parsed.players[2];
        assert_eq!(jo.jersey_number.as_deref(), Some("12"));
        assert_eq!(jo.roster_role, RosterRole::Manager);
        assert_eq!(jo.sports, vec![Sport::Soccer]);
    }

    #[test]
    fn headerless_table_uses_number_name_position() {
        let html = page(
            r#"<div class="team-roster"><table>
                 <tr><td>#9</td><td>Riley Cho</td><td>Midfield</td></tr>
               </table></div>"#,
        );
        let player = &parse_page(&html, Sport::Soccer, None).players[0];
        assert_eq!(player.name, "Riley Cho");
        assert_eq!(player.jersey_number.as_deref(), Some("9"));
        assert_eq!(player.position.as_deref(), Some("Midfield"));
    }

    #[test]
    fn coach_rows_become_coaches() {
        let html = page(
            r#"<div class="team-headcoach">Head Coach: Pat Smith</div>
               <div class="roster"><table>
                 <tr><th>Name</th><th>Position</th></tr>
                 <tr><td>pat smith</td><td>Head Coach</td></tr>
                 <tr><td>Dana Fox</td><td>Assistant Coach</td></tr>
               </table></div>
               <ul class="coaches">
                 <li><span class="coach-name">Lee Ortiz</span><span class="coach-title">Volunteer</span>
                     <a href="mailto:lee@example.org?subject=hi">email</a><a href="tel:555-0100">call</a></li>
               </ul>"#,
        );
        let parsed = parse_page(&html, Sport::Soccer, None);
        assert!(parsed.players.is_empty());
        let coaches: Vec<(&str, CoachRole)> =
            parsed.coaches.iter().map(|c| (c.name.as_str(), c.role)).collect();
        // No team name, so the head-coach marker is not seeded; the table row is.
        assert_eq!(
            coaches,
            vec![
                ("pat smith", CoachRole::Head),
                ("Dana Fox", CoachRole::Assistant),
                ("Lee Ortiz", CoachRole::Volunteer),
            ]
        );
        assert_eq!(parsed.coaches[2].email.as_deref(), Some("lee@example.org"));
        assert_eq!(parsed.coaches[2].phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn avatar_cards_only_decorate_known_players() {
        let html = page(
            r#"<div class="roster"><ul class="roster-list">
                 <li><span class="roster-name">Alex Kim</span></li>
               </ul></div>
               <div class="fsConstituentItem">
                 <img src="//cdn.example.com/alex.jpg"><span class="fsFullName">Alex Kim '27</span>
               </div>
               <div class="fsConstituentItem">
                 <img src="//cdn.example.com/ghost.jpg"><span class="fsFullName">Ghost Player '26</span>
               </div>"#,
        );
        let parsed = parse_page(&html, Sport::Soccer, None);
        assert_eq!(parsed.players.len(), 1);
        assert_eq!(parsed.players[0].photo.as_deref(), Some("https://cdn.example.com/alex.jpg"));
    }

    #[test]
    fn avatar_does_not_replace_an_existing_photo() {
        let html = page(
            r#"<div class="roster"><div class="roster-card">
                 <img src="/first.jpg"><span class="roster-name">Alex Kim</span>
               </div></div>
               <div class="avatar-card" title="Alex Kim '27"><img src="/second.jpg"></div>"#,
        );
        let parsed = parse_page(&html, Sport::Soccer, None);
        assert_eq!(parsed.players[0].photo.as_deref(), Some("/first.jpg"));
    }

    #[test]
    fn stats_block_with_bad_cell_is_omitted_alone() {
        let html = page(
            r#"<div class="team-stats">
                 <div class="overall"><table><tr><th>W</th><th>L</th><th>T</th><th>Pct</th></tr>
                   <tr><td>10</td><td>4</td><td>1</td><td>.700</td></tr></table></div>
                 <div class="league"><table><tr><td>5</td><td>1</td><td>0</td><td>n/a</td></tr></table></div>
                 <div class="non-league"><span class="stat-value">5</span><span class="stat-value">3</span>
                   <span class="stat-value">1</span><span class="stat-value">60%</span></div>
               </div>"#,
        );
        let stats = parse_page(&html, Sport::Soccer, None).imported_stats.unwrap();
        let overall = stats.overall.unwrap();
        assert_eq!((overall.wins, overall.losses, overall.ties), (10, 4, 1));
        assert!((overall.pct - 0.7).abs() < 1e-9);
        assert_eq!(stats.league, None);
        let non_league = stats.non_league.unwrap();
        assert!((non_league.pct - 0.6).abs() < 1e-9);
    }

    #[test]
    fn stats_sub_block_row_may_carry_a_label() {
        let html = page(
            r#"<div class="team-stats">
                 <div class="overall"><table>
                   <tr><td>Overall</td><td>8</td><td>3</td><td>1</td><td>.708</td></tr>
                 </table></div>
               </div>"#,
        );
        let overall = parse_page(&html, Sport::Soccer, None).imported_stats.unwrap().overall.unwrap();
        assert_eq!((overall.wins, overall.losses, overall.ties), (8, 3, 1));
        assert!((overall.pct - 0.708).abs() < 1e-9);
    }

    #[test]
    fn stats_single_table_with_labelled_rows() {
        let html = page(
            r#"<table class="team-stats">
                 <tr><td>Overall</td><td>8</td><td>2</td><td>0</td><td>0.800</td></tr>
                 <tr><td>Non-League</td><td>3</td><td>0</td><td>0</td><td>1.000</td></tr>
               </table>"#,
        );
        let stats = parse_page(&html, Sport::Soccer, None).imported_stats.unwrap();
        assert_eq!(stats.overall.map(|s| s.wins), Some(8));
        assert_eq!(stats.league, None);
        assert_eq!(stats.non_league.map(|s| s.wins), Some(3));
    }

    #[test]
    fn stats_with_no_valid_block_is_none() {
        let html = page(
            r#"<div class="team-stats"><div class="overall">
                 <table><tr><td>-</td><td>-</td><td>-</td><td>-</td></tr></table>
               </div></div>"#,
        );
        assert_eq!(parse_page(&html, Sport::Soccer, None).imported_stats, None);
    }

    #[test]
    fn same_input_same_output() {
        let html = page(&[
            r#"<h1 class="team-name">Tennis</h1>"#.to_string(),
            game_row("2/19/2026", r#"<span class="winloss">L</span><span class="score">2-5</span>"#),
            r#"<div class="roster"><ul class="roster-list"><li><span class="roster-name">A B</span></li></ul></div>"#
                .to_string(),
        ]
        .concat());
        let a = parse_page(&html, Sport::Tennis, None);
        let b = parse_page(&html, Sport::Tennis, None);
        assert_eq!(a, b);
    }

    #[test]
    fn garbage_input_yields_empty_page() {
        for input in ["", "not html at all", "{\"json\": true}", "<<<>>>", "\u{0}\u{1}"] {
            assert!(parse_page(input, Sport::Other, None).is_empty(), "input {input:?}");
        }
    }

    #[test]
    fn stat_percent_forms() {
        assert_eq!(parse_pct(".750"), Some(0.75));
        assert_eq!(parse_pct("75%"), Some(0.75));
        assert_eq!(parse_pct("NaN"), None);
        assert_eq!(parse_pct(""), None);
    }
}
