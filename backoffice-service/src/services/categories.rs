use serde_json::Value;
use service_core::error::AppError;
use sqlx::QueryBuilder;
use tracing::{info, instrument};

use crate::models::CategoryProduct;
use crate::services::procedure::{ProcedureCall, SuccessRule};
use crate::services::Database;
use crate::utils::{PageMeta, PageRequest};

impl Database {
    #[instrument(skip(self))]
    pub async fn list_categories(&self, active_only: bool) -> Result<Vec<Value>, AppError> {
        ProcedureCall::new("com.sp_listar_categorias")
            .arg(active_only)
            .records(self.pool())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: i32) -> Result<Value, AppError> {
        ProcedureCall::new("com.sp_obtener_categoria")
            .arg(id)
            .records(self.pool())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Category not found")))
    }

    /// Returns the new category id and the procedure's message.
    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        actor: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<(i64, String), AppError> {
        let accepted = ProcedureCall::new("com.sp_crear_categoria")
            .arg(actor)
            .arg(name)
            .arg(description)
            .outcome(self.pool())
            .await?
            .into_result(SuccessRule::NonNegative, "Could not create the category")?;

        info!(category_id = accepted.code, "Category created");
        Ok((i64::from(accepted.code), accepted.message_or("Category created")))
    }

    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        actor: &str,
        id: i32,
        name: &str,
        description: Option<&str>,
        active: bool,
    ) -> Result<String, AppError> {
        let accepted = ProcedureCall::new("com.sp_actualizar_categoria")
            .arg(actor)
            .arg(id)
            .arg(name)
            .arg(description)
            .arg(active)
            .outcome(self.pool())
            .await?
            .into_result(SuccessRule::Zero, "Could not update the category")?;

        Ok(accepted.message_or("Category updated"))
    }

    #[instrument(skip(self))]
    pub async fn delete_category(
        &self,
        actor: &str,
        id: i32,
        physical: bool,
    ) -> Result<String, AppError> {
        let accepted = ProcedureCall::new("com.sp_eliminar_categoria")
            .arg(actor)
            .arg(id)
            .arg(physical)
            .outcome(self.pool())
            .await?
            .into_result(SuccessRule::Zero, "Could not delete the category")?;

        Ok(accepted.message_or("Category deleted"))
    }

    /// Active products linked to a category, by name, with stock on hand.
    #[instrument(skip(self))]
    pub async fn category_products(
        &self,
        category_id: i32,
        page: PageRequest,
    ) -> Result<(Vec<CategoryProduct>, PageMeta), AppError> {
        let mut count = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM com.tb_producto p
            INNER JOIN com.tb_producto_categoria pc ON pc.id_producto = p.id_producto
            WHERE p.estado = true AND pc.id_categoria = "#,
        );
        count.push_bind(category_id);

        let mut rows = QueryBuilder::new(
            r#"
            SELECT p.id_producto::int AS id,
                   p.codigo AS code,
                   p.nombre AS name,
                   p.descripcion AS description,
                   p.precio_costo AS cost_price,
                   p.precio_venta AS sale_price,
                   COALESCE(p.descuento, 0) AS discount,
                   p.estado AS active,
                   COALESCE(s.existencia, 0)::int AS quantity
            FROM com.tb_producto p
            INNER JOIN com.tb_producto_categoria pc ON pc.id_producto = p.id_producto
            LEFT JOIN com.tb_stock s ON s.id_producto = p.id_producto
            WHERE p.estado = true AND pc.id_categoria = "#,
        );
        rows.push_bind(category_id)
            .push(" ORDER BY p.nombre LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let (products, total) = self.fetch_page("category_products", count, rows).await?;
        Ok((products, page.meta(total)))
    }
}
