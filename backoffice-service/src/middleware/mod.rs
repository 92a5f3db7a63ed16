pub mod acting_user;

pub use acting_user::{ActingUser, RequiredActingUser, ACTING_USER_HEADER, DEFAULT_ACTOR};
