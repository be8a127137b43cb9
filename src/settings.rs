use std::env;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";
pub const DEFAULT_TEAM_PAGE_URL: &str = "https://www.webb.org/athletic-teams";
pub const DEFAULT_TEAM_PAGE_QUERY: &str =
    "fromId=295792&Team=171408&SeasonLabel=2025%20-%202026&siteId=1850";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: String,
    pub upstream_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub team_page_url: String,
    pub team_page_query: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            upstream_timeout: teamsync_api::client::DEFAULT_TIMEOUT,
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 256,
            team_page_url: DEFAULT_TEAM_PAGE_URL.to_string(),
            team_page_query: DEFAULT_TEAM_PAGE_QUERY.to_string(),
        }
    }
}

impl Settings {
    /// Read `TEAMSYNC_*` variables. Unset or unparseable values keep the default.
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            bind: env_string("TEAMSYNC_BIND", defaults.bind),
            upstream_timeout: Duration::from_millis(env_u64(
                "TEAMSYNC_UPSTREAM_TIMEOUT_MS",
                defaults.upstream_timeout.as_millis() as u64,
            )),
            cache_ttl: Duration::from_secs(env_u64(
                "TEAMSYNC_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            cache_max_entries: env_usize("TEAMSYNC_CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            team_page_url: env_string("TEAMSYNC_TEAM_PAGE_URL", defaults.team_page_url),
            team_page_query: env_string("TEAMSYNC_TEAM_PAGE_QUERY", defaults.team_page_query),
        }
    }
}

fn env_string(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.bind, "0.0.0.0:3001");
        assert_eq!(s.upstream_timeout, Duration::from_millis(12_000));
        assert_eq!(s.cache_ttl, Duration::from_secs(300));
        assert_eq!(s.cache_max_entries, 256);
    }

    #[test]
    fn unset_variables_fall_back() {
        assert_eq!(env_u64("TEAMSYNC_TEST_SURELY_UNSET_U64", 7), 7);
        assert_eq!(env_usize("TEAMSYNC_TEST_SURELY_UNSET_USIZE", 9), 9);
    }
}
