use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::{info, instrument};

use crate::dtos::catalog::{CreateProductRequest, UpdateProductRequest};
use crate::dtos::money;
use crate::models::{Product, ProductRow};
use crate::services::database::{commit, is_unique_violation, record_transaction, AuditEntry};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::procedure::{ProcedureCall, SuccessRule};
use crate::services::Database;
use crate::utils::codes::product_code;
use crate::utils::validation::non_blank;
use crate::utils::{PageMeta, PageRequest};

const PRODUCT_ENTITY: &str = "com.tb_producto";

const PRODUCT_VIEW: &str = r#"
    SELECT id_producto::int AS id,
           codigo AS code,
           nombre AS name,
           categorias AS categories,
           precio_costo AS cost_price,
           precio_venta AS sale_price,
           COALESCE(cantidad, 0)::int AS quantity,
           estado AS active
    FROM inv.v_productos
    WHERE 1=1"#;

/// Product-list filters after normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub active: Option<bool>,
}

fn push_product_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &ProductFilters) {
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (nombre ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR codigo ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(active) = filters.active {
        builder.push(" AND estado = ").push_bind(active);
    }
}

/// Column changes of a product update, already converted to their stored types.
#[derive(Debug, Default, PartialEq)]
struct ProductChanges {
    name: Option<String>,
    description: Option<String>,
    cost_price: Option<Decimal>,
    sale_price: Option<Decimal>,
    discount: Option<Decimal>,
}

impl ProductChanges {
    fn from_request(req: &UpdateProductRequest) -> Result<Self, AppError> {
        Ok(Self {
            name: req.name.as_deref().map(|n| n.trim().to_string()),
            description: req.description.as_deref().map(|d| d.trim().to_string()),
            cost_price: req.cost_price.map(|v| money("costPrice", v)).transpose()?,
            sale_price: req.sale_price.map(|v| money("salePrice", v)).transpose()?,
            discount: req.discount.map(|v| money("discount", v)).transpose()?,
        })
    }

    /// `UPDATE com.tb_producto SET ...` for the supplied columns; `None` when nothing changes.
    fn update_query(&self, product_id: i32) -> Option<QueryBuilder<'static, Postgres>> {
        let mut builder = QueryBuilder::new("UPDATE com.tb_producto SET ");
        let mut any = false;
        {
            let mut set = builder.separated(", ");
            if let Some(name) = &self.name {
                set.push("nombre = ").push_bind_unseparated(name.clone());
                any = true;
            }
            if let Some(description) = &self.description {
                set.push("descripcion = ")
                    .push_bind_unseparated(description.clone());
                any = true;
            }
            if let Some(cost) = self.cost_price {
                set.push("precio_costo = ").push_bind_unseparated(cost);
                any = true;
            }
            if let Some(sale) = self.sale_price {
                set.push("precio_venta = ").push_bind_unseparated(sale);
                any = true;
            }
            if let Some(discount) = self.discount {
                set.push("descuento = ").push_bind_unseparated(discount);
                any = true;
            }
        }
        if !any {
            return None;
        }
        builder.push(" WHERE id_producto = ").push_bind(product_id);
        Some(builder)
    }
}

/// Distinct category ids, first occurrence order kept.
fn distinct_ids(ids: &[i32]) -> Vec<i32> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

async fn product_id_by_code(
    conn: &mut PgConnection,
    code: &str,
) -> Result<Option<i32>, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT id_producto::int FROM com.tb_producto WHERE codigo = $1")
        .bind(code)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to look up product: {}", e)))
}

async fn link_categories(
    conn: &mut PgConnection,
    product_id: i32,
    category_ids: &[i32],
) -> Result<(), AppError> {
    if category_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO com.tb_producto_categoria (id_producto, id_categoria)
        SELECT $1, c.id
        FROM UNNEST($2::int[]) AS c(id)
        WHERE NOT EXISTS (
            SELECT 1 FROM com.tb_producto_categoria pc
            WHERE pc.id_producto = $1 AND pc.id_categoria = c.id
        )
        "#,
    )
    .bind(product_id)
    .bind(category_ids.to_vec())
    .execute(conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to link categories: {}", e)))?;
    Ok(())
}

/// Audit row of a new product, keyed by its generated id.
fn creation_audit<'a>(actor: &'a str, product_id: i32, code: &str, name: &str) -> AuditEntry<'a> {
    AuditEntry {
        actor,
        operation: "INSERT",
        entity: PRODUCT_ENTITY,
        entity_key: product_id.to_string(),
        detail: format!("Product created {} - {}", code, name),
    }
}

impl Database {
    /// Reads a product through `inv.v_productos`.
    #[instrument(skip(self))]
    pub async fn get_product(&self, code: &str) -> Result<Product, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_product"])
            .start_timer();

        let mut builder = QueryBuilder::new(PRODUCT_VIEW);
        builder.push(" AND codigo = ").push_bind(code);
        let row = builder
            .build_query_as::<ProductRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get product: {}", e)))?;

        timer.observe_duration();

        row.map(Product::from)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Product not found")))
    }

    /// Uncategorised products sort last, then newest first.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filters: &ProductFilters,
        page: PageRequest,
    ) -> Result<(Vec<Product>, PageMeta), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM inv.v_productos WHERE 1=1");
        push_product_filters(&mut count, filters);

        let mut rows = QueryBuilder::new(PRODUCT_VIEW);
        push_product_filters(&mut rows, filters);
        rows.push(
            " ORDER BY CASE WHEN categorias IS NULL OR TRIM(categorias) = '' THEN 1 ELSE 0 END, \
             id_producto DESC LIMIT ",
        )
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

        let (products, total) = self
            .fetch_page::<ProductRow>("list_products", count, rows)
            .await?;
        Ok((
            products.into_iter().map(Product::from).collect(),
            page.meta(total),
        ))
    }

    /// Inserts the product, its stock row, its category links and the audit row together.
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create_product(
        &self,
        actor: &str,
        req: &CreateProductRequest,
    ) -> Result<Product, AppError> {
        let name = req.name.trim();
        let code = non_blank(req.code.as_deref()).unwrap_or_else(|| product_code(name));
        let cost_price = money("costPrice", req.cost_price.unwrap_or_default())?;
        let sale_price = money("salePrice", req.sale_price.unwrap_or_default())?;
        let discount = money("discount", req.discount.unwrap_or_default())?;
        let quantity = req.quantity.unwrap_or(0);

        let mut tx = self.begin().await?;

        if product_id_by_code(&mut tx, &code).await?.is_some() {
            return Err(AppError::Conflict(anyhow::anyhow!("Product code already exists")));
        }

        let product_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO com.tb_producto
                (codigo, nombre, descripcion, precio_costo, precio_venta, descuento, estado)
            VALUES ($1, $2, $3, $4, $5, $6, true)
            RETURNING id_producto::int
            "#,
        )
        .bind(&code)
        .bind(name)
        .bind(non_blank(req.description.as_deref()))
        .bind(cost_price)
        .bind(sale_price)
        .bind(discount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(anyhow::anyhow!("Product code already exists"))
            } else {
                AppError::DatabaseError(anyhow::anyhow!("Failed to insert product: {}", e))
            }
        })?;

        sqlx::query(
            "INSERT INTO com.tb_stock (id_producto, existencia, fecha_actualizacion) VALUES ($1, $2, NOW())",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert stock: {}", e)))?;

        link_categories(&mut tx, product_id, &distinct_ids(&req.categories)).await?;

        record_transaction(&mut *tx, creation_audit(actor, product_id, &code, name)).await?;

        commit(tx).await?;
        info!(code = %code, product_id, "Product created");

        self.get_product(&code).await
    }

    /// Applies only the supplied fields; `categories`, when given, becomes the exact link set.
    #[instrument(skip(self, req))]
    pub async fn update_product(
        &self,
        actor: &str,
        code: &str,
        req: &UpdateProductRequest,
    ) -> Result<Product, AppError> {
        let changes = ProductChanges::from_request(req)?;

        let mut tx = self.begin().await?;

        let product_id = product_id_by_code(&mut tx, code)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Product not found")))?;

        if let Some(mut update) = changes.update_query(product_id) {
            update
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update product: {}", e)))?;
        }

        if let Some(quantity) = req.quantity {
            sqlx::query(
                r#"
                INSERT INTO com.tb_stock (id_producto, existencia, fecha_actualizacion)
                VALUES ($1, $2, NOW())
                ON CONFLICT (id_producto)
                DO UPDATE SET existencia = EXCLUDED.existencia, fecha_actualizacion = NOW()
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update stock: {}", e)))?;
        }

        if let Some(categories) = &req.categories {
            let wanted = distinct_ids(categories);
            sqlx::query(
                r#"
                DELETE FROM com.tb_producto_categoria
                WHERE id_producto = $1 AND NOT (id_categoria = ANY($2::int[]))
                "#,
            )
            .bind(product_id)
            .bind(wanted.clone())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to unlink categories: {}", e))
            })?;
            link_categories(&mut tx, product_id, &wanted).await?;
        }

        record_transaction(
            &mut *tx,
            AuditEntry {
                actor,
                operation: "UPDATE",
                entity: PRODUCT_ENTITY,
                entity_key: code.to_string(),
                detail: format!("Product updated {}", code),
            },
        )
        .await?;

        commit(tx).await?;

        self.get_product(code).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(
        &self,
        actor: &str,
        code: &str,
        physical: bool,
    ) -> Result<String, AppError> {
        let mut conn = self.pool().acquire().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to acquire connection: {}", e))
        })?;

        let product_id = product_id_by_code(&mut conn, code)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Product not found")))?;

        let accepted = ProcedureCall::new("com.sp_eliminar_producto")
            .arg(actor)
            .arg(product_id)
            .arg(physical)
            .outcome(&mut *conn)
            .await?
            .into_result(SuccessRule::NonNegative, "Could not delete the product")?;

        Ok(accepted.message_or("Product deleted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_is_audited_under_the_product_id() {
        let entry = creation_audit("bodega1", 57, "AGUA-PUR-K3D9", "Agua pura");
        assert_eq!(entry.entity_key, "57");
        assert_eq!(entry.operation, "INSERT");
        assert_eq!(entry.entity, PRODUCT_ENTITY);
        assert_eq!(entry.detail, "Product created AGUA-PUR-K3D9 - Agua pura");
    }

    #[test]
    fn list_filters_match_name_or_code_and_status() {
        let mut builder = QueryBuilder::new("WHERE 1=1");
        push_product_filters(
            &mut builder,
            &ProductFilters {
                search: Some("agua".into()),
                active: Some(false),
            },
        );
        assert_eq!(
            builder.sql(),
            "WHERE 1=1 AND (nombre ILIKE $1 OR codigo ILIKE $2) AND estado = $3"
        );
    }

    #[test]
    fn update_sets_only_supplied_columns() {
        let changes = ProductChanges {
            name: Some("Agua 1L".into()),
            sale_price: Some(Decimal::new(650, 2)),
            ..Default::default()
        };
        let builder = changes.update_query(9).unwrap();
        assert_eq!(
            builder.sql(),
            "UPDATE com.tb_producto SET nombre = $1, precio_venta = $2 WHERE id_producto = $3"
        );
    }

    #[test]
    fn empty_update_builds_nothing() {
        assert!(ProductChanges::default().update_query(9).is_none());
    }

    #[test]
    fn changes_convert_amounts() {
        let req = UpdateProductRequest {
            cost_price: Some(2.499),
            description: Some("  fría ".into()),
            ..Default::default()
        };
        let changes = ProductChanges::from_request(&req).unwrap();
        assert_eq!(changes.cost_price, Some(Decimal::new(250, 2)));
        assert_eq!(changes.description.as_deref(), Some("fría"));
        assert!(changes.name.is_none());
    }

    #[test]
    fn category_ids_are_deduplicated() {
        assert_eq!(distinct_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
