pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod report;

pub use error::{AppError, Result};
