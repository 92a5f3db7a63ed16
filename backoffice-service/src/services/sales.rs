use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;
use sqlx::{Postgres, QueryBuilder};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::dtos::sales::{SaleRequest, SalesListQuery};
use crate::models::SaleSummary;
use crate::services::procedure::{ProcedureCall, SuccessRule};
use crate::services::Database;
use crate::utils::dates::DayWindow;
use crate::utils::validation::non_blank;
use crate::utils::{PageMeta, PageRequest};

/// Header and lines of one sale.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaleDetail {
    #[schema(value_type = Object)]
    pub header: Value,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Value>,
}

/// Sale-list filters after normalisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleFilters {
    pub window: DayWindow,
    pub user: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl From<&SalesListQuery> for SaleFilters {
    fn from(query: &SalesListQuery) -> Self {
        Self {
            window: DayWindow::between(query.date_from, query.date_to),
            user: non_blank(query.user.as_deref()),
            min_amount: query.min_amount.filter(|v| *v >= 0.0),
            max_amount: query.max_amount.filter(|v| *v >= 0.0),
        }
    }
}

fn push_sale_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &SaleFilters) {
    filters.window.push_conditions(builder, "v.fecha_venta");
    if let Some(user) = &filters.user {
        builder
            .push(" AND (v.usuario = ")
            .push_bind(user.clone())
            .push(" OR v.id_venta::text ILIKE ")
            .push_bind(format!("%{}%", user))
            .push(")");
    }
    if let Some(min) = filters.min_amount {
        builder.push(" AND v.total >= ").push_bind(min).push("::numeric");
    }
    if let Some(max) = filters.max_amount {
        builder.push(" AND v.total <= ").push_bind(max).push("::numeric");
    }
}

/// Adds `productName` from `nombre` or `nombreProducto`.
fn with_product_name(mut item: Value) -> Value {
    if let Value::Object(map) = &mut item {
        let name = ["nombre", "nombreProducto"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .unwrap_or("Unnamed product")
            .to_string();
        map.insert("productName".to_string(), Value::String(name));
    }
    item
}

impl Database {
    /// Returns the sale id and the procedure's message.
    #[instrument(skip(self, req), fields(items = req.items.len()))]
    pub async fn register_sale(
        &self,
        actor: &str,
        req: &SaleRequest,
    ) -> Result<(i64, String), AppError> {
        let detail = serde_json::to_string(&req.detail_lines()).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to encode sale detail: {}", e))
        })?;

        let accepted = ProcedureCall::new("com.sp_registrar_venta")
            .arg(actor)
            .arg(non_blank(req.note.as_deref()))
            .jsonb_arg(detail)
            .outcome(self.pool())
            .await?
            .into_result(SuccessRule::Positive, "Could not register the sale")?;

        info!(sale_id = accepted.code, "Sale registered");
        Ok((i64::from(accepted.code), accepted.message_or("Sale registered")))
    }

    #[instrument(skip(self))]
    pub async fn list_sales(
        &self,
        filters: &SaleFilters,
        page: PageRequest,
    ) -> Result<(Vec<SaleSummary>, PageMeta), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM com.tb_venta v WHERE 1=1");
        push_sale_filters(&mut count, filters);

        let mut rows = QueryBuilder::new(
            r#"
            SELECT v.id_venta::bigint AS id,
                   v.usuario AS username,
                   v.fecha_venta AS sold_at,
                   v.subtotal AS subtotal,
                   v.descuento_total AS discount_total,
                   v.total AS total,
                   v.observacion AS note,
                   COUNT(dv.id_detalle) AS item_count,
                   COALESCE(SUM(dv.cantidad), 0)::bigint AS unit_count
            FROM com.tb_venta v
            LEFT JOIN com.tb_detalle_venta dv ON dv.id_venta = v.id_venta
            WHERE 1=1"#,
        );
        push_sale_filters(&mut rows, filters);
        rows.push(
            " GROUP BY v.id_venta, v.usuario, v.fecha_venta, v.subtotal, v.descuento_total, \
             v.total, v.observacion ORDER BY v.fecha_venta DESC LIMIT ",
        )
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

        let (sales, total) = self.fetch_page("list_sales", count, rows).await?;
        Ok((sales, page.meta(total)))
    }

    #[instrument(skip(self))]
    pub async fn sale_detail(&self, id: i64) -> Result<SaleDetail, AppError> {
        let (header, items) = tokio::try_join!(
            ProcedureCall::new("com.sp_obtener_venta_cabecera")
                .arg(id)
                .records(self.pool()),
            ProcedureCall::new("com.sp_obtener_venta_items")
                .arg(id)
                .records(self.pool()),
        )?;

        let header = header
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sale not found")))?;

        Ok(SaleDetail {
            header,
            items: items.into_iter().map(with_product_name).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn negative_amounts_are_ignored() {
        let query = SalesListQuery {
            min_amount: Some(-1.0),
            max_amount: Some(500.0),
            ..Default::default()
        };
        let filters = SaleFilters::from(&query);
        assert_eq!(filters.min_amount, None);
        assert_eq!(filters.max_amount, Some(500.0));
    }

    #[test]
    fn user_filter_matches_seller_or_sale_number() {
        let filters = SaleFilters {
            user: Some("42".into()),
            window: DayWindow::between(NaiveDate::from_ymd_opt(2024, 5, 1), None),
            ..Default::default()
        };
        let mut builder = QueryBuilder::new("WHERE 1=1");
        push_sale_filters(&mut builder, &filters);
        assert_eq!(
            builder.sql(),
            "WHERE 1=1 AND v.fecha_venta >= $1 AND (v.usuario = $2 OR v.id_venta::text ILIKE $3)"
        );
    }

    #[test]
    fn items_get_a_product_name() {
        assert_eq!(
            with_product_name(json!({"nombre": "Agua"}))["productName"],
            "Agua"
        );
        assert_eq!(
            with_product_name(json!({"nombre": "", "nombreProducto": "Jugo"}))["productName"],
            "Jugo"
        );
        assert_eq!(
            with_product_name(json!({"cantidad": 2}))["productName"],
            "Unnamed product"
        );
    }
}
