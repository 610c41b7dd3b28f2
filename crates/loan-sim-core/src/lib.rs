pub mod config;
pub mod error;
pub mod limits;
pub mod simulation;
pub mod types;

#[cfg(feature = "locale")]
pub mod locale;

#[cfg(feature = "report")]
pub mod report;

pub use error::LoanSimError;
pub use types::*;

/// Standard result type for all loan-sim operations
pub type LoanSimResult<T> = Result<T, LoanSimError>;
