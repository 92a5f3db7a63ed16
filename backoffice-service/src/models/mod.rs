pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod product;
pub mod sale;
pub mod student;
pub mod user;

pub use audit::{AccessLogEntry, TransactionLogEntry};
pub use auth::{AuthenticatedUser, LoginRow};
pub use dashboard::{AdminStats, DashboardStats, SecretaryStats};
pub use product::{split_categories, CategoryProduct, Product, ProductRow};
pub use sale::SaleSummary;
pub use student::Student;
pub use user::{UserDetail, UserSummary};
