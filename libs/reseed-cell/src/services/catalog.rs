use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared_database::DbPool;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaSnapshot {
    pub schema: String,
    pub tables: BTreeMap<String, Vec<String>>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Reflection of the live schema: table names and their columns. Refreshed
/// at startup and after every reset so readers see the recreated structure.
pub struct SchemaCatalog {
    schema: String,
    snapshot: RwLock<SchemaSnapshot>,
}

impl SchemaCatalog {
    pub fn new(schema: impl Into<String>) -> Self {
        let schema = schema.into();
        Self {
            snapshot: RwLock::new(SchemaSnapshot {
                schema: schema.clone(),
                ..SchemaSnapshot::default()
            }),
            schema,
        }
    }

    pub async fn load(&self, pool: &DbPool) -> Result<SchemaSnapshot, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        self.refresh(&mut conn).await
    }

    pub async fn refresh(&self, conn: &mut SqliteConnection) -> Result<SchemaSnapshot, sqlx::Error> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut tables = BTreeMap::new();
        for name in names {
            let columns: Vec<String> =
                sqlx::query_scalar("SELECT name FROM pragma_table_info(?) ORDER BY cid")
                    .bind(&name)
                    .fetch_all(&mut *conn)
                    .await?;
            debug!("Reflected {} ({} columns)", name, columns.len());
            tables.insert(name, columns);
        }

        let snapshot = SchemaSnapshot {
            schema: self.schema.clone(),
            tables,
            refreshed_at: Some(Utc::now()),
        };
        info!("Schema catalog refreshed: {} tables", snapshot.tables.len());

        *self.snapshot.write().await = snapshot.clone();
        Ok(snapshot)
    }

    pub async fn snapshot(&self) -> SchemaSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn tables(&self) -> Vec<String> {
        self.snapshot.read().await.tables.keys().cloned().collect()
    }

    pub async fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.snapshot.read().await.tables.get(table).cloned()
    }

    pub async fn contains(&self, table: &str) -> bool {
        self.snapshot.read().await.tables.contains_key(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_database::pool::connect_in_memory;

    #[tokio::test]
    async fn load_reflects_tables_and_columns() {
        let pool = connect_in_memory().await.unwrap();
        sqlx::query("CREATE TABLE drug (id INTEGER PRIMARY KEY, name TEXT, common_ailment TEXT)")
            .execute(&pool)
            .await
            .unwrap();

        let catalog = SchemaCatalog::new("pharmacy_testing");
        assert!(catalog.tables().await.is_empty());

        catalog.load(&pool).await.unwrap();
        assert!(catalog.contains("drug").await);
        assert_eq!(
            catalog.columns("drug").await.unwrap(),
            vec!["id", "name", "common_ailment"]
        );
        assert_eq!(catalog.snapshot().await.schema, "pharmacy_testing");
    }

    #[tokio::test]
    async fn refresh_forgets_dropped_tables() {
        let pool = connect_in_memory().await.unwrap();
        sqlx::query("CREATE TABLE pharmacy (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();

        let catalog = SchemaCatalog::new("pharmacy_testing");
        catalog.load(&pool).await.unwrap();
        assert!(catalog.contains("pharmacy").await);

        sqlx::query("DROP TABLE pharmacy").execute(&pool).await.unwrap();
        catalog.load(&pool).await.unwrap();
        assert!(!catalog.contains("pharmacy").await);
    }
}
