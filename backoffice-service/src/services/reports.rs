use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;
use service_core::error::AppError;
use tracing::instrument;

use crate::dtos::reports::{InventoryReport, InventoryReportQuery};
use crate::services::procedure::ProcedureCall;
use crate::services::Database;
use crate::utils::validation::non_blank;

pub const DEFAULT_TOP_N: i32 = 10;

impl Database {
    #[instrument(skip(self))]
    pub async fn sales_report(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        user: Option<&str>,
        category_id: Option<i32>,
    ) -> Result<Vec<Value>, AppError> {
        ProcedureCall::new("com.sp_reporte_ventas_por_fecha")
            .arg(date_from)
            .arg(date_to)
            .arg(non_blank(user))
            .arg(category_id)
            .records(self.pool())
            .await
    }

    /// Current stock plus the most recent movements, fetched concurrently.
    #[instrument(skip(self))]
    pub async fn inventory_report(
        &self,
        query: &InventoryReportQuery,
    ) -> Result<InventoryReport, AppError> {
        let (inventory, movements) = tokio::try_join!(
            ProcedureCall::new("com.sp_reporte_inventario_actual")
                .arg(query.product_id)
                .arg(query.category_id)
                .records(self.pool()),
            ProcedureCall::new("com.sp_reporte_inventario_movimientos")
                .arg(query.product_id)
                .arg(query.category_id)
                .arg(query.recent())
                .records(self.pool()),
        )?;

        Ok(InventoryReport {
            inventory,
            movements,
        })
    }

    #[instrument(skip(self))]
    pub async fn top_products(
        &self,
        top_n: Option<i32>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<Value>, AppError> {
        ProcedureCall::new("com.sp_reporte_productos_mas_vendidos")
            .arg(top_n.unwrap_or(DEFAULT_TOP_N))
            .arg(date_from)
            .arg(date_to)
            .records(self.pool())
            .await
    }

    /// Revenue per period; a missing month yields the whole year.
    #[instrument(skip(self))]
    pub async fn revenue(&self, year: Option<i32>, month: Option<i32>) -> Result<Vec<Value>, AppError> {
        ProcedureCall::new("com.sp_reporte_ingresos_totales")
            .arg(year.unwrap_or_else(|| Utc::now().year()))
            .arg(month)
            .records(self.pool())
            .await
    }
}
