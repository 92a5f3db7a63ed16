//! Stored-procedure invocation.
//!
//! Procedures are set-returning functions called as `SELECT * FROM schema.name(...)`. Writes
//! answer with one row carrying `return_value` and `mensaje`, plus any extra output columns.
use crate::services::metrics::{DB_QUERY_DURATION, PROCEDURE_CALLS_TOTAL};
use crate::services::recordset::{row_to_json, rows_to_json};
use serde_json::{Map, Value};
use service_core::error::AppError;
use sqlx::postgres::PgRow;
use sqlx::{Executor, Postgres, QueryBuilder, Row};

/// Which return codes count as success for a given procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessRule {
    Zero,
    NonNegative,
    Positive,
}

impl SuccessRule {
    pub fn accepts(self, code: i32) -> bool {
        match self {
            SuccessRule::Zero => code == 0,
            SuccessRule::NonNegative => code >= 0,
            SuccessRule::Positive => code > 0,
        }
    }

    /// Label for `backoffice_procedure_calls_total`.
    fn label(self, code: i32) -> &'static str {
        if self.accepts(code) {
            "ok"
        } else {
            "rejected"
        }
    }
}

/// The single row a write procedure answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureOutcome {
    pub procedure: &'static str,
    pub code: i32,
    pub message: Option<String>,
    /// Every column of the row, camelCased; extra outputs such as `carneGenerado` live here.
    pub columns: Map<String, Value>,
}

/// A write the procedure accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub code: i32,
    pub message: Option<String>,
    pub columns: Map<String, Value>,
}

impl Accepted {
    pub fn message_or(&self, default: &str) -> String {
        self.message.clone().unwrap_or_else(|| default.to_string())
    }

    pub fn text(&self, column: &str) -> Option<String> {
        match self.columns.get(column) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl ProcedureOutcome {
    pub fn from_row(procedure: &'static str, row: &PgRow) -> Result<Self, sqlx::Error> {
        let code: i32 = row.try_get("return_value")?;
        let message: Option<String> = row.try_get("mensaje")?;
        let columns = match row_to_json(row) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(Self {
            procedure,
            code,
            message: message.filter(|m| !m.trim().is_empty()),
            columns,
        })
    }

    /// Reads the first row of a write procedure's answer.
    pub fn from_rows(procedure: &'static str, rows: &[PgRow]) -> Result<Self, AppError> {
        let row = rows.first().ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!("{} returned no rows", procedure))
        })?;
        let outcome = Self::from_row(procedure, row).map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!(
                "{} returned an unexpected row shape: {}",
                procedure,
                e
            ))
        })?;

        tracing::debug!(procedure, code = outcome.code, "Procedure returned");

        Ok(outcome)
    }

    /// Applies `rule`; a refused call becomes [`AppError::Rejected`] carrying the procedure's
    /// message, or `fallback` when it sent none.
    pub fn into_result(self, rule: SuccessRule, fallback: &str) -> Result<Accepted, AppError> {
        PROCEDURE_CALLS_TOTAL
            .with_label_values(&[self.procedure, rule.label(self.code)])
            .inc();
        if rule.accepts(self.code) {
            Ok(Accepted {
                code: self.code,
                message: self.message,
                columns: self.columns,
            })
        } else {
            Err(AppError::Rejected(
                self.message.unwrap_or_else(|| fallback.to_string()),
            ))
        }
    }
}

/// `SELECT * FROM name($1, $2, ...)` with every argument bound.
pub struct ProcedureCall<'args> {
    name: &'static str,
    builder: QueryBuilder<'args, Postgres>,
    arity: usize,
    closed: bool,
}

impl<'args> ProcedureCall<'args> {
    pub fn new(name: &'static str) -> Self {
        let mut builder = QueryBuilder::new("SELECT * FROM ");
        builder.push(name).push("(");
        Self {
            name,
            builder,
            arity: 0,
            closed: false,
        }
    }

    pub fn arg<T>(mut self, value: T) -> Self
    where
        T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
    {
        self.separate();
        self.builder.push_bind(value);
        self
    }

    /// Binds `value` only when present, so a trailing parameter keeps the procedure's default.
    pub fn optional_arg<T>(self, value: Option<T>) -> Self
    where
        T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
    {
        match value {
            Some(value) => self.arg(value),
            None => self,
        }
    }

    /// Binds text and casts it to `jsonb` on the server.
    pub fn jsonb_arg(mut self, value: String) -> Self {
        self.separate();
        self.builder.push_bind(value).push("::jsonb");
        self
    }

    fn separate(&mut self) {
        if self.arity > 0 {
            self.builder.push(", ");
        }
        self.arity += 1;
    }

    fn close(&mut self) {
        if !self.closed {
            self.builder.push(")");
            self.closed = true;
        }
    }

    pub fn sql(&mut self) -> &str {
        self.close();
        self.builder.sql()
    }

    async fn fetch_rows<'c, E>(&mut self, executor: E) -> Result<Vec<PgRow>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        self.close();
        let timer = DB_QUERY_DURATION
            .with_label_values(&[self.name])
            .start_timer();
        let rows = self.builder.build().fetch_all(executor).await;
        timer.observe_duration();
        if rows.is_err() {
            PROCEDURE_CALLS_TOTAL
                .with_label_values(&[self.name, "error"])
                .inc();
        }
        rows
    }

    /// Runs a read procedure and returns its recordset as camelCased JSON objects.
    pub async fn records<'c, E>(mut self, executor: E) -> Result<Vec<Value>, AppError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let rows = self.fetch_rows(executor).await.map_err(|e| self.failure(e))?;
        PROCEDURE_CALLS_TOTAL
            .with_label_values(&[self.name, "ok"])
            .inc();
        Ok(rows_to_json(&rows))
    }

    /// Runs a read procedure, surfacing the raw `sqlx` error for callers that branch on it.
    pub async fn try_rows<'c, E>(mut self, executor: E) -> Result<Vec<PgRow>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        self.fetch_rows(executor).await
    }

    /// Runs a write procedure and reads its return code and message.
    pub async fn outcome<'c, E>(mut self, executor: E) -> Result<ProcedureOutcome, AppError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let rows = self.fetch_rows(executor).await.map_err(|e| self.failure(e))?;
        ProcedureOutcome::from_rows(self.name, &rows)
    }

    fn failure(&self, e: sqlx::Error) -> AppError {
        AppError::DatabaseError(anyhow::anyhow!("Failed to call {}: {}", self.name, e))
    }
}

/// PostgreSQL `undefined_function`: the procedure does not exist in this database.
pub fn is_undefined_function(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("42883"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(code: i32, message: Option<&str>) -> ProcedureOutcome {
        ProcedureOutcome {
            procedure: "test.sp_write",
            code,
            message: message.map(str::to_string),
            columns: Map::new(),
        }
    }

    #[test]
    fn success_rules() {
        assert!(SuccessRule::Zero.accepts(0));
        assert!(!SuccessRule::Zero.accepts(7));
        assert!(SuccessRule::NonNegative.accepts(0));
        assert!(SuccessRule::NonNegative.accepts(12));
        assert!(!SuccessRule::NonNegative.accepts(-1));
        assert!(SuccessRule::Positive.accepts(1));
        assert!(!SuccessRule::Positive.accepts(0));
    }

    #[test]
    fn refused_codes_are_counted_as_rejected() {
        assert_eq!(SuccessRule::Zero.label(1), "rejected");
        assert_eq!(SuccessRule::NonNegative.label(1), "ok");
        assert_eq!(SuccessRule::Positive.label(0), "rejected");

        let counter = |label: &str| {
            PROCEDURE_CALLS_TOTAL
                .with_label_values(&["test.sp_zero_rule", label])
                .get()
        };
        let (ok_before, rejected_before) = (counter("ok"), counter("rejected"));

        let mut refused = outcome(1, Some("Sin cambios"));
        refused.procedure = "test.sp_zero_rule";
        assert!(refused.into_result(SuccessRule::Zero, "unused").is_err());

        assert_eq!(counter("ok"), ok_before);
        assert_eq!(counter("rejected"), rejected_before + 1);
    }

    #[test]
    fn rejection_carries_the_procedure_message() {
        let err = outcome(-2, Some("La categoría ya existe"))
            .into_result(SuccessRule::NonNegative, "Could not create category")
            .unwrap_err();
        assert!(matches!(err, AppError::Rejected(ref m) if m == "La categoría ya existe"));
    }

    #[test]
    fn rejection_without_message_uses_the_fallback() {
        let err = outcome(1, None)
            .into_result(SuccessRule::Zero, "Could not update student")
            .unwrap_err();
        assert_eq!(err.to_string(), "Could not update student");
    }

    #[test]
    fn accepted_exposes_extra_columns() {
        let mut columns = Map::new();
        columns.insert("carneGenerado".into(), Value::from("2024-0001"));
        columns.insert("idVenta".into(), Value::from(42));
        let accepted = ProcedureOutcome {
            procedure: "test.sp_write",
            code: 0,
            message: None,
            columns,
        }
        .into_result(SuccessRule::Zero, "unused")
        .unwrap();

        assert_eq!(accepted.text("carneGenerado").as_deref(), Some("2024-0001"));
        assert_eq!(accepted.text("idVenta").as_deref(), Some("42"));
        assert_eq!(accepted.message_or("Saved"), "Saved");
    }

    #[test]
    fn call_binds_arguments_in_order() {
        let mut call = ProcedureCall::new("com.sp_registrar_venta")
            .arg("sistema".to_string())
            .arg(None::<String>)
            .jsonb_arg("[]".to_string());
        assert_eq!(
            call.sql(),
            "SELECT * FROM com.sp_registrar_venta($1, $2, $3::jsonb)"
        );
    }

    #[test]
    fn absent_optional_arguments_are_left_out() {
        let mut call = ProcedureCall::new("seg.sp_insertar_estudiante")
            .arg("secretaria1")
            .optional_arg(None::<i32>);
        assert_eq!(call.sql(), "SELECT * FROM seg.sp_insertar_estudiante($1)");

        let mut call = ProcedureCall::new("seg.sp_insertar_estudiante")
            .arg("secretaria1")
            .optional_arg(Some(7));
        assert_eq!(call.sql(), "SELECT * FROM seg.sp_insertar_estudiante($1, $2)");
    }

    #[test]
    fn call_without_arguments() {
        let mut call = ProcedureCall::new("com.sp_reporte_inventario_actual");
        assert_eq!(call.sql(), "SELECT * FROM com.sp_reporte_inventario_actual()");
    }
}
