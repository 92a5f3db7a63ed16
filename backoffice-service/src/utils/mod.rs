pub mod codes;
pub mod dates;
pub mod extract;
pub mod pagination;
pub mod validation;

pub use extract::{ApiPath, ApiQuery, ValidatedJson, ValidatedQuery};
pub use pagination::{PageMeta, PageRequest};
