//! The installment calculation and validation engine.

pub mod installment;
pub mod pro_rata;
pub mod validation;

pub use installment::{
    compute_for, compute_installment, simulate, SimulationOutcome, SimulationResult,
};
pub use pro_rata::{extra_days_until, monthly_index_from_annual, regular_first_due_date};
pub use validation::{
    describe_band, validate, validate_with_policy, FailureKind, SimulationRequest,
    ValidatedRequest, ValidationFailure, ValidationField, ValidationOutcome, ValidationPolicy,
};
