use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::{Connection, SqliteConnection};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use shared_database::{AppState, DbPool};

use crate::models::{ReseedError, ReseedReport, StatementFailure};
use crate::services::catalog::SchemaCatalog;
use crate::services::script::{
    is_database_selection, is_transaction_control, preview, split_statements,
};

/// Every table the demo owns. Dropped in this order, which is not a
/// dependency order: enforcement is off while the drops run.
pub const RESET_TABLES: [&str; 9] = [
    "doctor",
    "patient",
    "patient_history",
    "drug",
    "prescription",
    "pharmacy",
    "pharmacist",
    "orders",
    "users",
];

pub struct ReseedEngine {
    pool: DbPool,
    script_path: PathBuf,
    tables: Vec<String>,
    catalog: Arc<SchemaCatalog>,
    running: Mutex<()>,
}

impl ReseedEngine {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            script_path: state.config.seed_script_path.clone(),
            tables: RESET_TABLES.iter().map(|t| t.to_string()).collect(),
            catalog: Arc::new(SchemaCatalog::new(state.config.database_schema.clone())),
            running: Mutex::new(()),
        }
    }

    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_script_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.script_path = path.into();
        self
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn catalog(&self) -> Arc<SchemaCatalog> {
        self.catalog.clone()
    }

    /// Wipes every demo table and replays the seed script.
    ///
    /// A statement that fails is rolled back to its own savepoint, reported
    /// and skipped. Anything else that fails (unreadable script, lost
    /// connection, failed drop) aborts the reset with an error. The script is
    /// read before anything is dropped.
    #[instrument(skip(self), fields(script = %self.script_path.display()))]
    pub async fn reset_demo(&self) -> Result<ReseedReport, ReseedError> {
        let _running = self.running.try_lock().map_err(|_| ReseedError::InProgress)?;

        let script = tokio::fs::read_to_string(&self.script_path)
            .await
            .map_err(|source| ReseedError::Script {
                path: self.script_path.clone(),
                source,
            })?;
        let statements = split_statements(&script);
        info!("Resetting demo database from {} statements", statements.len());

        let mut conn = self.pool.acquire().await?;
        let outcome = self.run(&mut conn, &statements).await;

        if outcome.is_err() {
            // The connection goes back to the pool; it must not keep
            // enforcement switched off.
            if let Err(err) = set_foreign_keys(&mut conn, true).await {
                warn!("Could not re-enable foreign keys after failed reset: {}", err);
            }
        }

        outcome
    }

    async fn run(
        &self,
        conn: &mut SqliteConnection,
        statements: &[String],
    ) -> Result<ReseedReport, ReseedError> {
        set_foreign_keys(conn, false).await?;
        self.drop_tables(conn).await?;
        set_foreign_keys(conn, true).await?;

        let mut report = replay(conn, statements).await?;

        conn.clear_cached_statements().await?;
        let snapshot = self.catalog.refresh(conn).await?;
        report.tables = row_counts(conn, snapshot.tables.keys()).await?;

        info!(
            "Demo reset finished: {} executed, {} skipped, {} failed",
            report.executed,
            report.skipped,
            report.failures.len()
        );
        Ok(report)
    }

    async fn drop_tables(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        for table in &self.tables {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
                .execute(&mut *conn)
                .await?;
            debug!("Dropped table {}", table);
        }
        Ok(())
    }
}

async fn set_foreign_keys(conn: &mut SqliteConnection, enabled: bool) -> Result<(), sqlx::Error> {
    let pragma = if enabled {
        "PRAGMA foreign_keys = ON"
    } else {
        "PRAGMA foreign_keys = OFF"
    };
    sqlx::query(pragma).execute(&mut *conn).await?;
    debug!("{}", pragma);
    Ok(())
}

/// Runs every statement inside one transaction, each under its own savepoint.
/// The script's own transaction statements would end that transaction early.
async fn replay(
    conn: &mut SqliteConnection,
    statements: &[String],
) -> Result<ReseedReport, sqlx::Error> {
    let mut report = ReseedReport::default();
    let mut tx = conn.begin().await?;

    for (position, statement) in statements.iter().enumerate() {
        let index = position + 1;

        if is_database_selection(statement) {
            debug!("Skipping database selection statement {}: {}", index, statement);
            report.skipped += 1;
            continue;
        }
        if is_transaction_control(statement) {
            debug!("Skipping transaction control statement {}: {}", index, statement);
            report.skipped += 1;
            continue;
        }

        let mut savepoint = tx.begin().await?;
        match sqlx::query(statement)
            .persistent(false)
            .execute(&mut *savepoint)
            .await
        {
            Ok(_) => {
                savepoint.commit().await?;
                report.executed += 1;
            }
            Err(err) => {
                savepoint.rollback().await?;
                let statement = preview(statement);
                warn!("Seed statement {} failed, skipping: {} ({})", index, err, statement);
                report.failures.push(StatementFailure {
                    index,
                    statement,
                    error: err.to_string(),
                });
            }
        }
    }

    tx.commit().await?;
    Ok(report)
}

async fn row_counts<'a, I>(
    conn: &mut SqliteConnection,
    tables: I,
) -> Result<BTreeMap<String, i64>, sqlx::Error>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut counts = BTreeMap::new();
    for table in tables {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)))
            .fetch_one(&mut *conn)
            .await?;
        counts.insert(table.clone(), count);
    }
    Ok(counts)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
