use service_core::error::AppError;
use sqlx::PgPool;
use tracing::instrument;

use crate::models::{AdminStats, DashboardStats, SecretaryStats};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::Database;

const TOTAL_STUDENTS: &str = "SELECT COUNT(*) FROM seg.tb_estudiante";

const STUDENTS_THIS_MONTH: &str = r#"
    SELECT COUNT(*) FROM seg.tb_estudiante
    WHERE fecha_registro >= date_trunc('month', CURRENT_DATE)"#;

const ACTIVE_USERS: &str = "SELECT COUNT(*) FROM seg.tb_usuario WHERE estado = true";

const ACCESSES_TODAY: &str = r#"
    SELECT COUNT(*) FROM seg.tb_bitacora_acceso
    WHERE resultado = 'OK' AND fecha_hora >= CURRENT_DATE"#;

const STUDENTS_TODAY: &str = r#"
    SELECT COUNT(*) FROM seg.tb_estudiante
    WHERE fecha_registro >= CURRENT_DATE"#;

async fn count(pool: &PgPool, sql: &'static str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await
}

impl Database {
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["dashboard_stats"])
            .start_timer();

        let (total_students, new_this_month, active_users, accesses_today, registered_today) =
            tokio::try_join!(
                count(self.pool(), TOTAL_STUDENTS),
                count(self.pool(), STUDENTS_THIS_MONTH),
                count(self.pool(), ACTIVE_USERS),
                count(self.pool(), ACCESSES_TODAY),
                count(self.pool(), STUDENTS_TODAY),
            )
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to load dashboard counts: {}", e))
            })?;
        timer.observe_duration();

        Ok(DashboardStats {
            admin: AdminStats {
                total_students,
                new_this_month,
                active_users,
                accesses_today,
            },
            secretary: SecretaryStats {
                total_students,
                new_this_month,
                active_students: total_students,
                registered_today,
            },
        })
    }
}
