use serde_json::Value;
use service_core::error::AppError;
use tracing::{info, instrument};

use crate::dtos::inventory::{MovementKind, MovementsQuery};
use crate::services::procedure::{ProcedureCall, SuccessRule};
use crate::services::Database;

impl Database {
    /// Returns the movement id and the procedure's message.
    #[instrument(skip(self, note))]
    pub async fn register_movement(
        &self,
        actor: &str,
        product_id: i32,
        quantity: i32,
        kind: MovementKind,
        note: Option<&str>,
    ) -> Result<(i64, String), AppError> {
        let accepted = ProcedureCall::new("com.sp_registrar_movimiento_inventario")
            .arg(actor)
            .arg(product_id)
            .arg(quantity)
            .arg(kind.code())
            .arg(note)
            .outcome(self.pool())
            .await?
            .into_result(SuccessRule::NonNegative, "Could not register the movement")?;

        info!(movement_id = accepted.code, "Inventory movement registered");
        Ok((i64::from(accepted.code), accepted.message_or("Movement registered")))
    }

    #[instrument(skip(self))]
    pub async fn stock_levels(
        &self,
        product_id: Option<i32>,
        min_stock: i32,
    ) -> Result<Vec<Value>, AppError> {
        ProcedureCall::new("com.sp_consultar_stock")
            .arg(product_id)
            .arg(min_stock)
            .records(self.pool())
            .await
    }

    #[instrument(skip(self))]
    pub async fn inventory_movements(&self, query: &MovementsQuery) -> Result<Vec<Value>, AppError> {
        let limit = query.limit.unwrap_or(100).clamp(1, 1000) as i32;
        ProcedureCall::new("com.sp_consultar_movimientos_inventario")
            .arg(query.product_id)
            .arg(query.kind.map(MovementKind::code))
            .arg(query.date_from)
            .arg(query.date_to)
            .arg(limit)
            .records(self.pool())
            .await
    }
}
