use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Where screenshots land when the step's run is not registered.
    pub artifact_root: PathBuf,
    /// Fixed interval between assertion polls.
    pub assert_poll_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            artifact_root: env::var("UIPILOT_ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("artifacts")),
            assert_poll_ms: env::var("UIPILOT_ASSERT_POLL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        }
    }

    pub fn assert_poll_interval(&self) -> Duration {
        Duration::from_millis(self.assert_poll_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_root: PathBuf::from("artifacts"),
            assert_poll_ms: 100,
        }
    }
}
