use anyhow::{Context as AnyhowContext, Result};
use dotenv_watcher::WatcherConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEBOUNCE_ENV: &str = "DOTENV_MANAGER_DEBOUNCE_MS";

/// How long transient status messages stay on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub path: PathBuf,
    pub watch: bool,
    pub watcher: WatcherConfig,
    pub status_ttl: Duration,
}

impl SessionConfig {
    pub fn new(path: PathBuf, watch: bool, debounce: Duration) -> Self {
        Self {
            path,
            watch,
            watcher: WatcherConfig {
                debounce,
                ..WatcherConfig::default()
            },
            status_ttl: STATUS_TTL,
        }
    }
}

/// The flag wins over the environment; both fall back to the watcher default.
pub fn debounce_from(flag: Option<u64>, env_value: Option<&str>) -> Result<Duration> {
    if let Some(ms) = flag {
        return Ok(Duration::from_millis(ms));
    }
    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("{DEBOUNCE_ENV} must be milliseconds, got '{raw}'"))?;
            Ok(Duration::from_millis(ms))
        }
        None => Ok(WatcherConfig::default().debounce),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        let d = debounce_from(Some(50), Some("900")).unwrap();
        assert_eq!(d, Duration::from_millis(50));
    }

    #[test]
    fn environment_beats_default() {
        let d = debounce_from(None, Some(" 750 ")).unwrap();
        assert_eq!(d, Duration::from_millis(750));
    }

    #[test]
    fn default_is_half_a_second() {
        assert_eq!(debounce_from(None, None).unwrap(), Duration::from_millis(500));
        assert_eq!(debounce_from(None, Some("")).unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn garbage_in_environment_is_an_error() {
        let err = debounce_from(None, Some("soon")).unwrap_err();
        assert!(err.to_string().contains(DEBOUNCE_ENV));
    }
}
