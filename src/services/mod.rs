pub mod cache;
pub mod errors;
pub mod students;

pub use errors::{ServiceError, ServiceResult};
