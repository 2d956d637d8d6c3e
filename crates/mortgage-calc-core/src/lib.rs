pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "calculator")]
pub mod calculator;

#[cfg(feature = "calculator")]
pub mod config;

#[cfg(feature = "lead")]
pub mod lead;

#[cfg(feature = "application")]
pub mod application;

pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage-calc operations
pub type MortgageResult<T> = Result<T, MortgageError>;
