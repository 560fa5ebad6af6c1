use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::flash::Flash;

/// A seed statement that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFailure {
    /// 1-based position of the statement in the script.
    pub index: usize,
    pub statement: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReseedReport {
    pub executed: usize,
    pub skipped: usize,
    pub failures: Vec<StatementFailure>,
    /// Row count per table after the replay.
    pub tables: BTreeMap<String, i64>,
}

impl ReseedReport {
    pub fn row_count(&self, table: &str) -> Option<i64> {
        self.tables.get(table).copied()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub flash: Flash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReseedReport>,
}

#[derive(Debug, Error)]
pub enum ReseedError {
    #[error("could not read seed script {}: {source}", path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("a demo reset is already in progress")]
    InProgress,
}
