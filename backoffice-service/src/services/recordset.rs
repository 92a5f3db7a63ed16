//! Pass-through of stored-procedure recordsets as JSON objects.
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use uuid::Uuid;

/// `id_producto` → `idProducto`.
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

pub fn row_to_json(row: &PgRow) -> Value {
    let mut map = Map::with_capacity(row.columns().len());
    for column in row.columns() {
        map.insert(
            snake_to_camel(column.name()),
            column_value(row, column.ordinal(), column.type_info().name()),
        );
    }
    Value::Object(map)
}

pub fn rows_to_json(rows: &[PgRow]) -> Vec<Value> {
    rows.iter().map(row_to_json).collect()
}

fn column_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    let decoded = match type_name {
        "BOOL" => row.try_get::<bool, _>(index).map(Value::from),
        "INT2" => row.try_get::<i16, _>(index).map(Value::from),
        "INT4" => row.try_get::<i32, _>(index).map(Value::from),
        "INT8" => row.try_get::<i64, _>(index).map(Value::from),
        "FLOAT4" => row.try_get::<f32, _>(index).map(Value::from),
        "FLOAT8" => row.try_get::<f64, _>(index).map(Value::from),
        "NUMERIC" => row
            .try_get::<Decimal, _>(index)
            .map(|d| d.to_f64().map(Value::from).unwrap_or(Value::Null)),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => {
            row.try_get::<String, _>(index).map(Value::from)
        }
        "DATE" => row
            .try_get::<NaiveDate, _>(index)
            .map(|d| Value::from(d.format("%Y-%m-%d").to_string())),
        "TIME" => row
            .try_get::<NaiveTime, _>(index)
            .map(|t| Value::from(t.format("%H:%M:%S").to_string())),
        "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .map(|t| Value::from(t.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<DateTime<Utc>, _>(index)
            .map(|t| Value::from(t.to_rfc3339())),
        "UUID" => row
            .try_get::<Uuid, _>(index)
            .map(|u| Value::from(u.to_string())),
        "JSON" | "JSONB" => row.try_get::<Value, _>(index),
        other => {
            tracing::debug!(column_type = other, "Unsupported recordset column type");
            return Value::Null;
        }
    };

    decoded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, column = index, "Failed to decode recordset column");
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_snake_case_columns() {
        assert_eq!(snake_to_camel("id_producto"), "idProducto");
        assert_eq!(snake_to_camel("precio_venta_total"), "precioVentaTotal");
        assert_eq!(snake_to_camel("nombre"), "nombre");
        assert_eq!(snake_to_camel("_interno"), "interno");
        assert_eq!(snake_to_camel("total__items"), "totalItems");
    }
}
