//! Loan desk: installment schedules, rule-based approval and the application
//! pipeline for bank loan products.

pub mod config;
pub mod error;
pub mod lending;
pub mod telemetry;

pub use config::AppConfig;
pub use error::AppError;
