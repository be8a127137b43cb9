pub mod client;
pub mod extract;
pub mod normalize;
pub mod store;
pub mod text;

pub use normalize::parse_page;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Program identity: the (sport, gender, level) triple every record is tagged with
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Soccer,
    Baseball,
    #[default]
    Tennis,
    Football,
    Badminton,
    Swim,
    CrossCountry,
    Volleyball,
    WaterPolo,
    Golf,
    Wrestling,
    SwimDive,
    Basketball,
    Other,
}

impl Sport {
    pub const ALL: [Sport; 14] = [
        Sport::Soccer,
        Sport::Baseball,
        Sport::Tennis,
        Sport::Football,
        Sport::Badminton,
        Sport::Swim,
        Sport::CrossCountry,
        Sport::Volleyball,
        Sport::WaterPolo,
        Sport::Golf,
        Sport::Wrestling,
        Sport::SwimDive,
        Sport::Basketball,
        Sport::Other,
    ];

    /// Identifier used in program keys and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Soccer => "soccer",
            Sport::Baseball => "baseball",
            Sport::Tennis => "tennis",
            Sport::Football => "football",
            Sport::Badminton => "badminton",
            Sport::Swim => "swim",
            Sport::CrossCountry => "cross_country",
            Sport::Volleyball => "volleyball",
            Sport::WaterPolo => "water_polo",
            Sport::Golf => "golf",
            Sport::Wrestling => "wrestling",
            Sport::SwimDive => "swim_dive",
            Sport::Basketball => "basketball",
            Sport::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sport::Soccer => "Soccer",
            Sport::Baseball => "Baseball",
            Sport::Tennis => "Tennis",
            Sport::Football => "Football",
            Sport::Badminton => "Badminton",
            Sport::Swim => "Swim",
            Sport::CrossCountry => "Cross Country",
            Sport::Volleyball => "Volleyball",
            Sport::WaterPolo => "Water Polo",
            Sport::Golf => "Golf",
            Sport::Wrestling => "Wrestling",
            Sport::SwimDive => "Swim & Dive",
            Sport::Basketball => "Basketball",
            Sport::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Boys,
    Girls,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Boys => "boys",
            Gender::Girls => "girls",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Boys => "Boys",
            Gender::Girls => "Girls",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Varsity,
    Jv,
    Frosh,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Varsity => "varsity",
            Level::Jv => "jv",
            Level::Frosh => "frosh",
        }
    }

    /// "Varsity" spelled out, the lower levels shouted ("JV", "FROSH").
    pub fn label(&self) -> &'static str {
        match self {
            Level::Varsity => "Varsity",
            Level::Jv => "JV",
            Level::Frosh => "FROSH",
        }
    }
}

/// Error returned when a sport/gender/level identifier is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownValue {}

impl FromStr for Sport {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Sport::ALL
            .into_iter()
            .find(|sport| sport.as_str() == wanted)
            .ok_or_else(|| UnknownValue { kind: "sport", value: s.to_owned() })
    }
}

impl FromStr for Gender {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boys" | "boy" | "men" => Ok(Gender::Boys),
            "girls" | "girl" | "women" => Ok(Gender::Girls),
            _ => Err(UnknownValue { kind: "gender", value: s.to_owned() }),
        }
    }
}

impl FromStr for Level {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "varsity" | "v" => Ok(Level::Varsity),
            "jv" | "junior varsity" => Ok(Level::Jv),
            "frosh" | "freshman" => Ok(Level::Frosh),
            _ => Err(UnknownValue { kind: "level", value: s.to_owned() }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Program {
    pub sport: Sport,
    pub gender: Gender,
    pub level: Level,
}

impl Program {
    pub fn new(sport: Sport, gender: Gender, level: Level) -> Self {
        Self { sport, gender, level }
    }

    /// Identity key shared with the store layer, e.g. `soccer_boys_varsity`.
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.sport.as_str(), self.gender.as_str(), self.level.as_str())
    }

    pub fn label(&self) -> String {
        format!(
            "{} {} · {}",
            self.gender.label(),
            self.sport.display_name(),
            self.level.label()
        )
    }
}

/// Gender/level tagging context for a parse. Source pages don't say which
/// program they belong to, so the caller does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramContext {
    pub gender: Gender,
    pub level: Level,
}

impl ProgramContext {
    pub fn program(&self, sport: Sport) -> Program {
        Program::new(sport, self.gender, self.level)
    }
}

// ---------------------------------------------------------------------------
// Parsed records, independent of the source markup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Venue {
    #[default]
    Home,
    Away,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub won: bool,
    pub score: String, // "3-2"
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub sport: Sport,
    pub gender: Gender,
    pub level: Level,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>, // free text, "4:00 PM"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    pub venue: Venue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub is_league: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

impl Game {
    pub fn program(&self) -> Program {
        Program::new(self.sport, self.gender, self.level)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterRole {
    #[default]
    Player,
    Manager,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hometown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub roster_role: RosterRole,
    pub sports: Vec<Sport>,
    pub program_key: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoachRole {
    #[serde(rename = "Head Coach")]
    Head,
    #[default]
    #[serde(rename = "Assistant Coach")]
    Assistant,
    #[serde(rename = "Volunteer")]
    Volunteer,
}

impl CoachRole {
    pub fn label(&self) -> &'static str {
        match self {
            CoachRole::Head => "Head Coach",
            CoachRole::Assistant => "Assistant Coach",
            CoachRole::Volunteer => "Volunteer",
        }
    }

    /// Infer the role from a free-text title ("Varsity Head Coach", "Volunteer Assistant").
    pub fn from_title(title: &str) -> Self {
        let lower = title.to_lowercase();
        if lower.contains("volunteer") {
            CoachRole::Volunteer
        } else if lower.contains("head") {
            CoachRole::Head
        } else {
            CoachRole::Assistant
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub id: String,
    pub name: String,
    pub role: CoachRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub sports: Vec<Sport>,
    pub program_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub name: String,
    pub sport: Sport,
    pub season: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_coach: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WinLossStats {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub pct: f64,
}

/// Win/loss splits copied verbatim from a page's statistics block. Not
/// reconciled with the tally computed from individual game results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedTeamStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<WinLossStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<WinLossStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_league: Option<WinLossStats>,
}

impl ImportedTeamStats {
    pub fn is_empty(&self) -> bool {
        self.overall.is_none() && self.league.is_none() && self.non_league.is_none()
    }
}

/// Everything one parse pulled out of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPage {
    pub team_info: Option<TeamInfo>,
    pub games: Vec<Game>,
    pub players: Vec<Player>,
    pub coaches: Vec<Coach>,
    pub imported_stats: Option<ImportedTeamStats>,
}

impl ParsedPage {
    /// True when nothing at all was found. Callers decide whether that is an error.
    pub fn is_empty(&self) -> bool {
        self.team_info.is_none()
            && self.games.is_empty()
            && self.players.is_empty()
            && self.coaches.is_empty()
            && self.imported_stats.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_key_joins_fields_with_underscores() {
        let p = Program::new(Sport::CrossCountry, Gender::Girls, Level::Jv);
        assert_eq!(p.key(), "cross_country_girls_jv");
        assert_eq!(p.label(), "Girls Cross Country · JV");
    }

    #[test]
    fn sport_parses_loose_spellings() {
        assert_eq!("Water Polo".parse::<Sport>(), Ok(Sport::WaterPolo));
        assert_eq!("swim-dive".parse::<Sport>(), Ok(Sport::SwimDive));
        assert!("curling".parse::<Sport>().is_err());
    }

    #[test]
    fn coach_role_from_title() {
        assert_eq!(CoachRole::from_title("Varsity Head Coach"), CoachRole::Head);
        assert_eq!(CoachRole::from_title("Volunteer Assistant"), CoachRole::Volunteer);
        assert_eq!(CoachRole::from_title("Goalkeeper Coach"), CoachRole::Assistant);
    }

    #[test]
    fn coach_role_serializes_as_display_label() {
        let json = serde_json::to_string(&CoachRole::Head).unwrap();
        assert_eq!(json, "\"Head Coach\"");
    }
}
