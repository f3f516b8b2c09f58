use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{Client, StatusCode};

use crate::{
    config::AccrualConfig,
    data_objects::{OrderVerdict, PollOutcome},
    error::AccrualApiError,
};

/// Seconds to back off when the service rate-limits us without a usable `Retry-After` header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AccrualApi {
    config: AccrualConfig,
    client: Arc<Client>,
}

impl AccrualApi {
    pub fn new(config: AccrualConfig) -> Result<Self, AccrualApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AccrualApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Asks the accrual service for the current verdict on `number`. Issues exactly one outbound request and never
    /// retries; every failure mode is folded into the returned [`PollOutcome`].
    pub async fn order_status(&self, number: &str) -> PollOutcome {
        let url = self.config.order_url(number);
        trace!("🎯️ Polling accrual service: {url}");
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("🎯️ Accrual service unreachable for order {number}. {e}");
                return PollOutcome::Unavailable;
            },
        };
        match response.status() {
            StatusCode::OK => match response.json::<OrderVerdict>().await {
                Ok(verdict) => {
                    trace!("🎯️ Order {number} verdict: {}", verdict.status);
                    PollOutcome::Verdict(verdict)
                },
                Err(e) => {
                    warn!("🎯️ Accrual service returned a malformed verdict body for order {number}. {e}");
                    PollOutcome::Unavailable
                },
            },
            StatusCode::NO_CONTENT => {
                trace!("🎯️ Order {number} is not registered with the accrual service yet");
                PollOutcome::NotRegistered
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let delay = retry_after(&response).unwrap_or(DEFAULT_RETRY_AFTER);
                debug!("🎯️ Accrual service is rate limiting us. Retry after {}s", delay.as_secs());
                PollOutcome::RateLimited(delay)
            },
            status => {
                debug!("🎯️ Accrual service returned status {status} for order {number}");
                PollOutcome::Unavailable
            },
        }
    }
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
