use clap::{Parser, ValueEnum};

/// Two-team football league tracker
#[derive(Parser, Debug, Clone)]
#[command(name = "derby-tracker", version, about)]
pub struct Config {
    /// Dashboard listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "derby.db")]
    pub database_path: String,

    /// Shared admin PIN gating add/delete/reset (seeds the store on first run)
    #[arg(long, env = "ADMIN_PIN", default_value = "1234")]
    pub admin_pin: String,

    /// Display name of the home team
    #[arg(long, env = "HOME_TEAM", default_value = "Home")]
    pub home_team: String,

    /// Display name of the away team
    #[arg(long, env = "AWAY_TEAM", default_value = "Away")]
    pub away_team: String,

    /// Number of most-recent matches kept in the history window
    #[arg(long, env = "HISTORY_WINDOW", default_value = "10")]
    pub history_window: usize,

    /// Whether the retention window bounds the standings aggregate or only
    /// the displayed history list
    #[arg(long, env = "RETENTION_MODE", value_enum, default_value = "display-only")]
    pub retention_mode: RetentionMode,

    /// Cache the standings table as a store snapshot, refreshed on every write
    #[arg(long, env = "SNAPSHOT_CACHE", default_value = "false")]
    pub snapshot_cache: bool,

    /// Retention sweep interval in seconds (bounded mode only)
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value = "60")]
    pub sweep_interval_secs: u64,
}

/// How the retention window is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RetentionMode {
    /// Keep full history in the store; the window only bounds the displayed
    /// match list and standings cover every recorded match
    DisplayOnly,
    /// Purge beyond the window after every add; standings reflect only the
    /// retained matches
    Bounded,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history_window == 0 {
            anyhow::bail!("history_window must be at least 1");
        }
        if self.admin_pin.is_empty() || !self.admin_pin.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("admin_pin must be numeric and non-empty");
        }
        if self.home_team == self.away_team {
            anyhow::bail!("home_team and away_team must differ");
        }
        if self.sweep_interval_secs == 0 {
            anyhow::bail!("sweep_interval_secs must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::parse_from(["derby-tracker"])
    }

    #[test]
    fn defaults_are_valid() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_zero_window() {
        let mut config = base_config();
        config.history_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_numeric_pin() {
        let mut config = base_config();
        config.admin_pin = "12ab".into();
        assert!(config.validate().is_err());
        config.admin_pin.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_identical_team_names() {
        let mut config = base_config();
        config.away_team = config.home_team.clone();
        assert!(config.validate().is_err());
    }
}
