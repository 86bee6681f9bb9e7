//! Runner configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by the `bt` subcommands.
///
/// Command line flags take precedence over these values.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Sleep between ticks of a running tree.
    pub tick_interval: Duration,
    /// Stop after this many ticks; unlimited when `None`.
    pub max_ticks: Option<u64>,
    /// Directory for `bt.log`; file logging is off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(10),
            max_ticks: None,
            log_dir: None,
        }
    }
}

impl CliConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BT_TICK_INTERVAL_MS` - Sleep between ticks in milliseconds (default: 10)
    /// - `BT_MAX_TICKS` - Tick limit for `bt run` (default: unlimited)
    /// - `BT_LOG_DIR` - Also write logs to `<dir>/bt.log`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(millis) = read_env::<u64>("BT_TICK_INTERVAL_MS") {
            config.tick_interval = Duration::from_millis(millis);
        }
        if let Some(max) = read_env::<u64>("BT_MAX_TICKS") {
            config.max_ticks = Some(max);
        }
        if let Some(dir) = read_env::<PathBuf>("BT_LOG_DIR") {
            config.log_dir = Some(dir);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CliConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(10));
        assert!(config.max_ticks.is_none());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn read_env_returns_none_when_unset() {
        assert_eq!(read_env::<u64>("BT_CLI_TEST_SURELY_UNSET"), None);
    }
}
