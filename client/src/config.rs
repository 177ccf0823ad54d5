use std::{env, time::Duration};

use url::Url;

use crate::Result;

/// Interval between repeated requests when nothing else is configured
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(300);

/// Settings injected into a [`LifeGame`](crate::LifeGame) at construction time
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL of the game page; every action is posted here
    pub game_url: Url,
    /// Delay before re-issuing a poll request
    pub request_interval: Duration,
}

impl ClientConfig {
    /// Create a config for the game page at `game_url` with the default interval
    pub fn new(game_url: &str) -> Result<Self> {
        let game_url = Url::parse(game_url)?;
        Ok(Self {
            game_url,
            request_interval: DEFAULT_REQUEST_INTERVAL,
        })
    }

    pub fn with_request_interval(mut self, request_interval: Duration) -> Self {
        self.request_interval = request_interval;
        self
    }

    /// Read `LIFEGAME_URL` and `LIFEGAME_REQUEST_INTERVAL_MS` from the environment
    pub fn from_env() -> Result<Self> {
        let game_url = env::var("LIFEGAME_URL").map_err(|_| "LIFEGAME_URL is not set")?;

        let interval_ms: u64 = env::var("LIFEGAME_REQUEST_INTERVAL_MS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        Ok(Self::new(&game_url)?.with_request_interval(Duration::from_millis(interval_ms)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// The environment is process-wide; tests touching it take turns
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<R>(url: Option<&str>, interval: Option<&str>, f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: every test reading or writing these variables holds ENV_LOCK
        unsafe {
            match url {
                Some(url) => env::set_var("LIFEGAME_URL", url),
                None => env::remove_var("LIFEGAME_URL"),
            }
            match interval {
                Some(interval) => env::set_var("LIFEGAME_REQUEST_INTERVAL_MS", interval),
                None => env::remove_var("LIFEGAME_REQUEST_INTERVAL_MS"),
            }
        }
        f()
    }

    #[test]
    fn from_env_requires_url() {
        let result = with_env(None, Some("50"), ClientConfig::from_env);
        assert!(result.is_err());
    }

    #[test]
    fn from_env_defaults_interval() {
        let config = with_env(Some("http://localhost:5000/game/9"), None, ClientConfig::from_env)
            .unwrap();
        assert_eq!(config.game_url.path(), "/game/9");
        assert_eq!(config.request_interval, DEFAULT_REQUEST_INTERVAL);
    }

    #[test]
    fn from_env_reads_interval_override() {
        let config = with_env(
            Some("http://localhost:5000/game/9"),
            Some("75"),
            ClientConfig::from_env,
        )
        .unwrap();
        assert_eq!(config.request_interval, Duration::from_millis(75));
    }

    #[test]
    fn from_env_falls_back_on_garbage_interval() {
        let config = with_env(
            Some("http://localhost:5000/game/9"),
            Some("soon"),
            ClientConfig::from_env,
        )
        .unwrap();
        assert_eq!(config.request_interval, DEFAULT_REQUEST_INTERVAL);
    }

    #[test]
    fn new_uses_default_interval() {
        let config = ClientConfig::new("http://localhost:5000/game/3").unwrap();
        assert_eq!(config.request_interval, Duration::from_millis(300));
        assert_eq!(config.game_url.path(), "/game/3");
    }

    #[test]
    fn interval_can_be_overridden() {
        let config = ClientConfig::new("http://localhost:5000/game/3")
            .unwrap()
            .with_request_interval(Duration::from_millis(25));
        assert_eq!(config.request_interval, Duration::from_millis(25));
    }

    #[test]
    fn invalid_url_is_rejected() {
        assert!(ClientConfig::new("not a url").is_err());
    }
}
