//! Database handle for backoffice-service.
//!
//! Domain queries live in `impl Database` blocks next to this file, one per area.

use crate::config::DatabaseConfig;
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Executor, FromRow, Postgres, QueryBuilder, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Builds the pool without connecting; the first query opens a connection.
    #[instrument(skip(config), fields(service = "backoffice-service"))]
    pub fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid DATABASE_URL: {}", e)))?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Configuring PostgreSQL pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .idle_timeout(Duration::from_secs(600))
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Runs a `COUNT(*)` query and the matching page query concurrently.
    pub(crate) async fn fetch_page<'q, T>(
        &self,
        operation: &'static str,
        mut count: QueryBuilder<'q, Postgres>,
        mut rows: QueryBuilder<'q, Postgres>,
    ) -> Result<(Vec<T>, i64), AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let timer = DB_QUERY_DURATION
            .with_label_values(&[operation])
            .start_timer();

        let (total, items) = tokio::try_join!(
            count.build_query_scalar::<i64>().fetch_one(&self.pool),
            rows.build_query_as::<T>().fetch_all(&self.pool),
        )
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to {}: {}", operation, e)))?;

        timer.observe_duration();

        Ok((items, total))
    }

    pub(crate) async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to start transaction: {}", e))
        })
    }
}

pub(crate) async fn commit(tx: Transaction<'static, Postgres>) -> Result<(), AppError> {
    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e)))
}

/// PostgreSQL `unique_violation`.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

/// One row of `seg.tb_bitacora_transacciones`.
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub actor: &'a str,
    pub operation: &'a str,
    pub entity: &'a str,
    pub entity_key: String,
    pub detail: String,
}

/// Appends to the transaction log; the actor's user id is resolved by username.
pub(crate) async fn record_transaction<'c, E>(executor: E, entry: AuditEntry<'_>) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO seg.tb_bitacora_transacciones
            (usuario, id_usuario, operacion, entidad, clave_entidad, detalle)
        VALUES ($1, (SELECT id_usuario FROM seg.tb_usuario WHERE usuario = $1), $2, $3, $4, $5)
        "#,
    )
    .bind(entry.actor)
    .bind(entry.operation)
    .bind(entry.entity)
    .bind(&entry.entity_key)
    .bind(&entry.detail)
    .execute(executor)
    .await
    .map_err(|e| {
        AppError::DatabaseError(anyhow::anyhow!(
            "Failed to record {} on {}: {}",
            entry.operation,
            entry.entity,
            e
        ))
    })?;

    Ok(())
}
