use std::{env, time::Duration};

use accrual_client::AccrualConfig;
use log::*;
use loyalty_engine::reconciliation::ReconcileConfig;
use lpg_common::Secret;
use rand::{distributions::Alphanumeric, Rng};

use crate::errors::ServerError;

const DEFAULT_LPG_HOST: &str = "127.0.0.1";
const DEFAULT_LPG_PORT: u16 = 8080;
// mode=rwc lets a first run create the database file instead of refusing to start.
const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty_store.db?mode=rwc";
const DEFAULT_JWT_EXPIRY: chrono::Duration = chrono::Duration::hours(24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Where to reach the external accrual scoring service.
    pub accrual: AccrualConfig,
    /// Cadence and shutdown behaviour of the reconciliation worker.
    pub reconcile: ReconcileConfig,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LPG_HOST.to_string(),
            port: DEFAULT_LPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            accrual: AccrualConfig::default(),
            reconcile: ReconcileConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("LPG_HOST").ok().unwrap_or_else(|| DEFAULT_LPG_HOST.into());
        let port = env::var("LPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for LPG_PORT. {e} Using the default, {DEFAULT_LPG_PORT}, instead."
                    );
                    DEFAULT_LPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_LPG_PORT);
        let database_url = env::var("LPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LPG_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let accrual = AccrualConfig::from_env_or_default();
        let reconcile = configure_reconcile();
        Self { host, port, database_url, accrual, reconcile, auth }
    }
}

fn configure_reconcile() -> ReconcileConfig {
    let mut config = ReconcileConfig::default();
    match env::var("LPG_POLL_INTERVAL_SECS") {
        Ok(s) => match s.parse::<u64>() {
            Ok(secs) if secs > 0 => config.poll_interval = Duration::from_secs(secs),
            _ => warn!("🪛️ Invalid configuration value for LPG_POLL_INTERVAL_SECS ({s}). Using the default."),
        },
        Err(_) => {
            info!(
                "🪛️ LPG_POLL_INTERVAL_SECS is not set. Sweeping every {}s.",
                config.poll_interval.as_secs()
            );
        },
    }
    config
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an issued token stays valid.
    pub token_expiry: chrono::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. Every \
             outstanding token becomes invalid when the server restarts. Set LPG_JWT_SECRET in production. 🚨️🚨️🚨️"
        );
        let secret: String = rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret), token_expiry: DEFAULT_JWT_EXPIRY }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("LPG_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [LPG_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("LPG_JWT_SECRET must not be empty".to_string()));
        }
        let token_expiry = env::var("LPG_JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for LPG_JWT_EXPIRY_HOURS. {e}"))
                    .ok()
            })
            .map(chrono::Duration::hours)
            .unwrap_or(DEFAULT_JWT_EXPIRY);
        Ok(Self { jwt_secret: Secret::new(secret), token_expiry })
    }
}
