use std::time::Duration;

use plotline_core::types::DbId;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Plotline service, without trailing slash.
    pub api_url: String,
    /// User on whose behalf generation requests are made.
    pub user_id: DbId,
    /// HTTP request timeout in seconds (default: `180`; generation is slow).
    pub request_timeout_secs: u64,
    /// Pause between consecutive requests of a batch loop (default: `500`).
    pub batch_delay_ms: u64,
    /// Retries per failed batch item (default: `0`).
    pub batch_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            user_id: 1,
            request_timeout_secs: 180,
            batch_delay_ms: 500,
            batch_retries: 0,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `PLOTLINE_API_URL`               | `http://localhost:3000` |
    /// | `PLOTLINE_USER_ID`               | `1`                     |
    /// | `PLOTLINE_REQUEST_TIMEOUT_SECS`  | `180`                   |
    /// | `PLOTLINE_BATCH_DELAY_MS`        | `500`                   |
    /// | `PLOTLINE_BATCH_RETRIES`         | `0`                     |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = std::env::var("PLOTLINE_API_URL")
            .unwrap_or(defaults.api_url)
            .trim_end_matches('/')
            .to_string();

        let user_id: DbId = std::env::var("PLOTLINE_USER_ID")
            .map(|v| v.parse().expect("PLOTLINE_USER_ID must be a valid i64"))
            .unwrap_or(defaults.user_id);

        let request_timeout_secs: u64 = std::env::var("PLOTLINE_REQUEST_TIMEOUT_SECS")
            .map(|v| {
                v.parse()
                    .expect("PLOTLINE_REQUEST_TIMEOUT_SECS must be a valid u64")
            })
            .unwrap_or(defaults.request_timeout_secs);

        let batch_delay_ms: u64 = std::env::var("PLOTLINE_BATCH_DELAY_MS")
            .map(|v| v.parse().expect("PLOTLINE_BATCH_DELAY_MS must be a valid u64"))
            .unwrap_or(defaults.batch_delay_ms);

        let batch_retries: u32 = std::env::var("PLOTLINE_BATCH_RETRIES")
            .map(|v| v.parse().expect("PLOTLINE_BATCH_RETRIES must be a valid u32"))
            .unwrap_or(defaults.batch_retries);

        Self {
            api_url,
            user_id,
            request_timeout_secs,
            batch_delay_ms,
            batch_retries,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}
