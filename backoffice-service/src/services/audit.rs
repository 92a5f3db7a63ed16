use service_core::error::AppError;
use sqlx::{Postgres, QueryBuilder};
use tracing::instrument;

use crate::dtos::audit::{AccessLogFilters, TransactionLogFilters};
use crate::models::{AccessLogEntry, TransactionLogEntry};
use crate::services::Database;
use crate::utils::dates::DayWindow;
use crate::utils::{PageMeta, PageRequest};

const ACCESS_FROM: &str = r#"
    FROM seg.tb_bitacora_acceso ba
    INNER JOIN seg.tb_usuario u ON ba.id_usuario = u.id_usuario
    WHERE 1=1"#;

const TRANSACTION_FROM: &str = r#"
    FROM seg.tb_bitacora_transacciones t
    WHERE 1=1"#;

fn push_access_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &AccessLogFilters) {
    if let Some(role) = &filters.role {
        builder.push(" AND u.rol = ").push_bind(role.clone());
    }
    if let Some(username) = &filters.username {
        builder
            .push(" AND ba.usuario ILIKE ")
            .push_bind(format!("%{}%", username));
    }
    if let Some(status) = &filters.status {
        builder.push(" AND ba.resultado = ").push_bind(status.clone());
    }
    DayWindow::day_or_between(filters.date_from, filters.date_to)
        .push_conditions(builder, "ba.fecha_hora");
}

fn push_transaction_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    filters: &TransactionLogFilters,
) {
    if let Some(username) = &filters.username {
        builder
            .push(" AND t.usuario ILIKE ")
            .push_bind(format!("%{}%", username));
    }
    if let Some(action) = &filters.action {
        builder.push(" AND t.operacion = ").push_bind(action.clone());
    }
    if let Some(entity) = &filters.entity {
        builder.push(" AND t.entidad = ").push_bind(entity.clone());
    }
    DayWindow::between(filters.date_from, filters.date_to).push_conditions(builder, "t.fecha_hora");
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    builder
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());
}

impl Database {
    #[instrument(skip(self))]
    pub async fn list_access_log(
        &self,
        filters: &AccessLogFilters,
        page: PageRequest,
    ) -> Result<(Vec<AccessLogEntry>, PageMeta), AppError> {
        let mut count = QueryBuilder::new(format!("SELECT COUNT(*){}", ACCESS_FROM));
        push_access_filters(&mut count, filters);

        let mut rows = QueryBuilder::new(format!(
            r#"
            SELECT ba.id_acceso::bigint AS id,
                   ba.fecha_hora AS occurred_at,
                   ba.usuario AS username,
                   ba.id_usuario AS user_id,
                   COALESCE(ba.resultado, '') AS status,
                   COALESCE(NULLIF(u.rol, ''), 'N/A') AS role
            {}"#,
            ACCESS_FROM
        ));
        push_access_filters(&mut rows, filters);
        rows.push(" ORDER BY ba.fecha_hora DESC");
        push_page(&mut rows, page);

        let (entries, total) = self.fetch_page("list_access_log", count, rows).await?;
        Ok((entries, page.meta(total)))
    }

    #[instrument(skip(self))]
    pub async fn list_transaction_log(
        &self,
        filters: &TransactionLogFilters,
        page: PageRequest,
    ) -> Result<(Vec<TransactionLogEntry>, PageMeta), AppError> {
        let mut count = QueryBuilder::new(format!("SELECT COUNT(*){}", TRANSACTION_FROM));
        push_transaction_filters(&mut count, filters);

        let mut rows = QueryBuilder::new(format!(
            r#"
            SELECT t.id_transaccion::bigint AS id,
                   t.fecha_hora AS occurred_at,
                   t.usuario AS username,
                   t.id_usuario AS user_id,
                   t.operacion AS operation,
                   t.entidad AS entity,
                   t.clave_entidad AS entity_key,
                   t.detalle AS detail
            {}"#,
            TRANSACTION_FROM
        ));
        push_transaction_filters(&mut rows, filters);
        rows.push(" ORDER BY t.fecha_hora DESC");
        push_page(&mut rows, page);

        let (entries, total) = self
            .fetch_page("list_transaction_log", count, rows)
            .await?;
        Ok((entries, page.meta(total)))
    }
}
