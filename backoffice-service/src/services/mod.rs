//! Services layer for backoffice-service.
//!
//! `Database` owns the pool; each business area adds its queries and procedure calls to it in
//! its own file.

mod audit;
mod auth;
mod categories;
mod dashboard;
mod database;
mod inventory;
pub mod metrics;
mod notifier;
pub mod procedure;
mod products;
pub mod recordset;
mod reports;
mod sales;
mod students;
mod users;

pub use auth::{LoginOutcome, TemporaryCredential};
pub use database::{AuditEntry, Database};
pub use metrics::{get_metrics, init_metrics};
pub use notifier::{CredentialNotifier, LogNotifier, MockNotifier, NotifierError};
pub use products::ProductFilters;
pub use reports::DEFAULT_TOP_N;
pub use sales::{SaleDetail, SaleFilters};
pub use students::{StudentFilters, StudentPage};
