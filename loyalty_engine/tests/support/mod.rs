// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use log::*;
use loyalty_engine::{
    db_types::OrderNumber,
    reconciliation::{PollResult, VerdictSource},
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Creates a fresh, fully migrated database at `url` and hands back a connected handle.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    let _ = env_logger::try_init();
    create_database(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

pub fn random_db_url() -> String {
    format!("sqlite://{}/lpg_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

/// A verdict source driven by a per-order script of canned responses. Records every poll so tests can assert what
/// the sweep did (and did not) touch. Once an order's script runs dry, further polls report `Unavailable`.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    inner: Arc<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    script: Mutex<HashMap<String, VecDeque<PollResult>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn enqueue(&self, number: &str, result: PollResult) {
        self.inner.script.lock().unwrap().entry(number.to_string()).or_default().push_back(result);
    }

    /// Every order number polled so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }
}

impl VerdictSource for ScriptedSource {
    async fn fetch_verdict(&self, number: &OrderNumber) -> PollResult {
        self.inner.calls.lock().unwrap().push(number.as_str().to_string());
        self.inner
            .script
            .lock()
            .unwrap()
            .get_mut(number.as_str())
            .and_then(VecDeque::pop_front)
            .unwrap_or(PollResult::Unavailable)
    }
}
