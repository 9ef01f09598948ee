pub mod error;
pub mod health;
pub mod lots;
pub mod openapi;

pub use error::ApiError;
