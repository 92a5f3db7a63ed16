use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Row of `inv.v_productos`; `categories` is the view's joined name list.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub categories: Option<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub quantity: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub categories: Vec<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub quantity: i32,
    pub active: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            categories: split_categories(row.categories.as_deref()),
            id: row.id,
            code: row.code,
            name: row.name,
            cost_price: row.cost_price,
            sale_price: row.sale_price,
            quantity: row.quantity,
            active: row.active,
        }
    }
}

/// Splits the view's category list on `;`, `|` or `,`, dropping blanks.
pub fn split_categories(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split([';', '|', ','])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Active product linked to a category, with its stock on hand.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProduct {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub discount: Decimal,
    pub active: bool,
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_separator() {
        assert_eq!(
            split_categories(Some("Bebidas; Lácteos|Snacks , ")),
            vec!["Bebidas", "Lácteos", "Snacks"]
        );
    }

    #[test]
    fn missing_list_is_empty() {
        assert!(split_categories(None).is_empty());
        assert!(split_categories(Some("  ")).is_empty());
    }
}
