use std::{env, time::Duration};

use log::*;

const DEFAULT_ACCRUAL_URL: &str = "http://127.0.0.1:8081";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct AccrualConfig {
    /// Base URL of the accrual service, e.g. `http://accrual.internal:8081`. No trailing slash.
    pub base_url: String,
    /// Deadline for a single status request. An overrun is reported as [`PollOutcome::Unavailable`], never an error.
    ///
    /// [`PollOutcome::Unavailable`]: crate::PollOutcome::Unavailable
    pub timeout: Duration,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_ACCRUAL_URL.to_string(), timeout: DEFAULT_TIMEOUT }
    }
}

impl AccrualConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self { base_url: trim_trailing_slash(base_url.into()), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let base_url = env::var("LPG_ACCRUAL_URL").map(trim_trailing_slash).unwrap_or_else(|_| {
            warn!("🎯️ LPG_ACCRUAL_URL is not set. Using the default, {DEFAULT_ACCRUAL_URL}.");
            DEFAULT_ACCRUAL_URL.to_string()
        });
        let timeout = env::var("LPG_ACCRUAL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🎯️ Invalid value for LPG_ACCRUAL_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { base_url, timeout }
    }

    pub fn order_url(&self, number: &str) -> String {
        format!("{}/api/orders/{number}", self.base_url)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
