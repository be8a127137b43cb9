use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{GameResult, Venue};

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("invalid regex: date")
});

// Outcome token, optional separators, then the score. Nothing else in between.
static RE_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(win|loss|w|l)\b[\s,:;/-]*(\d+)\s*[-–]\s*(\d+)").expect("invalid regex: result")
});

static RE_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*[-–]\s*(\d+)").expect("invalid regex: score")
});

static RE_CLASS_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*['’‘`]\d{2}\s*$").expect("invalid regex: class year")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn won(self) -> bool {
        self == Outcome::Win
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "w" | "win" => Some(Outcome::Win),
            "l" | "loss" => Some(Outcome::Loss),
            _ => None,
        }
    }
}

/// Find the first `M/D/YYYY` date anywhere in `text` ("Thursday, 2/19/2026").
///
/// A match that is not a real calendar day (2/30/2026) is treated like no match.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = RE_DATE.captures(text)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// First `N-N` pair in `text`, whitespace removed and en-dash turned into a hyphen.
pub fn parse_score(text: &str) -> Option<String> {
    let caps = RE_SCORE.captures(text)?;
    Some(format!("{}-{}", &caps[1], &caps[2]))
}

/// Free-text result scan: a whole-word `W`/`L`/`Win`/`Loss` directly followed
/// (separators aside) by a score. The first such pair in `text` wins.
///
/// A stray token elsewhere ("L.A. Baptist") or a score far from the token is
/// not a result.
pub fn parse_result(text: &str) -> Option<GameResult> {
    let caps = RE_RESULT.captures(text)?;
    let outcome = Outcome::from_token(&caps[1])?;
    Some(GameResult { won: outcome.won(), score: format!("{}-{}", &caps[2], &caps[3]) })
}

/// Read the outcome off a dedicated marker element.
///
/// A class named `win`/`loss`, or element text that is exactly
/// `win`/`w`/`loss`/`l`, counts as a signal. When both signals are present
/// the row is treated as a loss.
pub fn outcome_from_marker<'a>(classes: impl IntoIterator<Item = &'a str>, text: &str) -> Option<Outcome> {
    let mut win = false;
    let mut loss = false;
    for class in classes {
        match class.to_ascii_lowercase().as_str() {
            "win" => win = true,
            "loss" => loss = true,
            _ => {}
        }
    }
    match Outcome::from_token(text.trim()) {
        Some(Outcome::Win) => win = true,
        Some(Outcome::Loss) => loss = true,
        None => {}
    }

    if loss {
        Some(Outcome::Loss)
    } else if win {
        Some(Outcome::Win)
    } else {
        None
    }
}

/// Home unless the site label says otherwise.
pub fn parse_venue(text: &str) -> Venue {
    match text.trim().to_ascii_lowercase().as_str() {
        "away" | "@" => Venue::Away,
        "neutral" => Venue::Neutral,
        _ => Venue::Home,
    }
}

/// Drop a trailing graduating-class suffix: `Jane Doe '27` -> `Jane Doe`.
pub fn strip_class_year(name: &str) -> &str {
    match RE_CLASS_YEAR.find(name) {
        Some(m) => name[..m.start()].trim(),
        None => name.trim(),
    }
}

/// Remove a leading label such as `Head Coach:` (case-insensitive).
pub fn strip_label<'a>(text: &'a str, label: &str) -> &'a str {
    let trimmed = text.trim();
    match trimmed.get(..label.len()) {
        Some(head) if head.eq_ignore_ascii_case(label) => trimmed[label.len()..].trim(),
        _ => trimmed,
    }
}
