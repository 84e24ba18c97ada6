use std::marker::PhantomData;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use crate::store::{ListFilter, Store};

/// JSONB-backed store. All namespaces share the `stored_records` table
/// (created by `db::ensure_schema`).
pub struct PgStore<T> {
    pool: PgPool,
    namespace: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PgStore<T> {
    pub fn new(pool: PgPool, namespace: &'static str) -> Self {
        Self {
            pool,
            namespace,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Store<T> for PgStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<T>> {
        let value: Option<Value> = sqlx::query_scalar(
            "SELECT value FROM stored_records WHERE namespace = $1 AND key = $2",
        )
        .bind(self.namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        value
            .map(|v| {
                serde_json::from_value(v)
                    .with_context(|| format!("Corrupt record {}/{key}", self.namespace))
            })
            .transpose()
    }

    async fn put(&self, key: &str, value: T) -> Result<()> {
        let json = serde_json::to_value(&value)?;

        // Upsert: concurrent writers to one key are last-write-wins.
        sqlx::query(
            r#"
            INSERT INTO stored_records (namespace, key, value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (namespace, key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(self.namespace)
        .bind(key)
        .bind(json)
        .execute(&self.pool)
        .await?;

        debug!("Stored {}/{}", self.namespace, key);
        Ok(())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<T>> {
        let limit = filter.limit.map(|n| n as i64);

        let rows: Vec<Value> = sqlx::query_scalar(
            r#"
            SELECT value FROM stored_records
            WHERE namespace = $1
              AND ($2::text IS NULL OR starts_with(key, $2))
            ORDER BY key
            LIMIT $3
            "#,
        )
        .bind(self.namespace)
        .bind(filter.key_prefix.as_deref())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|v| serde_json::from_value(v).map_err(Into::into))
            .collect()
    }
}
