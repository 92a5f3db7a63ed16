//! HTTP handlers for backoffice-service, one module per business area.

pub mod audit;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod inventory;
pub mod metrics;
pub mod products;
pub mod reports;
pub mod sales;
pub mod students;
pub mod users;

use serde::Serialize;
use service_core::error::AppError;

/// Effective list filters, for the envelope's `filters` member.
pub(crate) fn encode_filters<T: Serialize>(filters: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(filters)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode filters: {}", e)))
}
