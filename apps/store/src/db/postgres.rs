//! PostgreSQL JSONB document backend

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;

use super::filter::Filter;
use super::traits::{
    Collection, DocumentDatabase, InsertResult, ReplaceOptions, ReplaceResult, StoredDocument,
};
use crate::{config::DatabaseConfig, Error, Result};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Every clause of the filter bound as `$2` must be contained in the document
const MATCHES_FILTER: &str = "NOT EXISTS (
    SELECT 1 FROM jsonb_array_elements($2::jsonb) AS clause
    WHERE NOT documents.document @> clause.value
)";

/// Database handle backed by a sqlx connection pool
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration, running migrations if enabled
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(config.pool_min_size)
            .max_connections(config.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
            .connect(&config.url)
            .await?;

        tracing::info!(
            max_connections = config.pool_max_size,
            "Connected to PostgreSQL"
        );

        let db = Self::new(pool);
        if config.run_migrations {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl DocumentDatabase for PgDatabase {
    type Collection = PgCollection;

    fn collection(&self, name: &str) -> PgCollection {
        PgCollection {
            name: name.to_string(),
            pool: self.pool.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PgCollection {
    name: String,
    pool: PgPool,
}

impl PgCollection {
    /// Unique violations become `DuplicateKey`; everything else stays a database error
    fn map_write_error(&self, key: &str, err: sqlx::Error) -> Error {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Error::DuplicateKey {
                    collection: self.name.clone(),
                    key: key.to_string(),
                };
            }
        }
        Error::Database(err)
    }
}

fn decode_row(row: &sqlx::postgres::PgRow) -> Result<StoredDocument> {
    Ok(StoredDocument {
        storage_id: row.try_get("storage_id")?,
        document: row.try_get::<JsonValue, _>("document")?,
    })
}

#[async_trait]
impl Collection for PgCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = $1")
                .bind(&self.name)
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<StoredDocument>> {
        let query = format!(
            "SELECT storage_id, document
             FROM documents
             WHERE collection = $1 AND {MATCHES_FILTER}
             ORDER BY storage_id
             LIMIT 1"
        );

        let row = sqlx::query(&query)
            .bind(&self.name)
            .bind(filter.to_json())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_row).transpose()
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<StoredDocument>> {
        let query = format!(
            "SELECT storage_id, document
             FROM documents
             WHERE collection = $1 AND {MATCHES_FILTER}
             ORDER BY storage_id"
        );

        let rows = sqlx::query(&query)
            .bind(&self.name)
            .bind(filter.to_json())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, document: StoredDocument) -> Result<InsertResult> {
        let row = sqlx::query(
            "INSERT INTO documents (collection, storage_id, document)
             VALUES ($1, $2, $3)
             RETURNING storage_id, document",
        )
        .bind(&self.name)
        .bind(&document.storage_id)
        .bind(&document.document)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| self.map_write_error(&document.storage_id, e))?;

        Ok(InsertResult {
            inserted: vec![decode_row(&row)?],
        })
    }

    async fn find_one_and_replace(
        &self,
        filter: &Filter,
        document: StoredDocument,
        options: ReplaceOptions,
    ) -> Result<ReplaceResult> {
        let key = document
            .resource_id()
            .unwrap_or(&document.storage_id)
            .to_string();

        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT storage_id
             FROM documents
             WHERE collection = $1 AND {MATCHES_FILTER}
             ORDER BY storage_id
             LIMIT 1
             FOR UPDATE"
        );
        let matched: Option<(String,)> = sqlx::query_as(&select)
            .bind(&self.name)
            .bind(filter.to_json())
            .fetch_optional(&mut *tx)
            .await?;

        let (row, upserted) = match matched {
            Some((storage_id,)) => {
                let row = sqlx::query(
                    "UPDATE documents
                     SET document = $3
                     WHERE collection = $1 AND storage_id = $2
                     RETURNING storage_id, document",
                )
                .bind(&self.name)
                .bind(&storage_id)
                .bind(&document.document)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| self.map_write_error(&key, e))?;
                (Some(row), false)
            }
            None if options.upsert => {
                let row = sqlx::query(
                    "INSERT INTO documents (collection, storage_id, document)
                     VALUES ($1, $2, $3)
                     RETURNING storage_id, document",
                )
                .bind(&self.name)
                .bind(&document.storage_id)
                .bind(&document.document)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| self.map_write_error(&key, e))?;
                (Some(row), true)
            }
            None => (None, false),
        };

        tx.commit().await?;

        Ok(ReplaceResult {
            value: row.as_ref().map(decode_row).transpose()?,
            upserted,
        })
    }

    async fn remove(&self, filter: &Filter) -> Result<u64> {
        let query = format!("DELETE FROM documents WHERE collection = $1 AND {MATCHES_FILTER}");

        let result = sqlx::query(&query)
            .bind(&self.name)
            .bind(filter.to_json())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
