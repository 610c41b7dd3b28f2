//! Request validation against the rate-limit table in effect.
//!
//! Checks run in a fixed order and the first failure wins, so a rejected
//! request always carries exactly one user-facing message.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::limits::{EffectiveBand, RateLimitTable, MAX_INSTALLMENTS, MIN_INSTALLMENTS};
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// One simulation as entered by the user, already parsed into numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Amount borrowed.
    pub principal: Money,
    /// Number of equal installments requested.
    pub installment_count: u32,
    /// Interest rate per period in percent (15 = 15%).
    pub rate_pct: Percent,
    /// Pro-rata days before the first regular period.
    #[serde(default)]
    pub extra_days: u32,
    /// Price-index adjustment per period in percent.
    #[serde(default)]
    pub monthly_index_rate_pct: Percent,
}

impl SimulationRequest {
    pub fn new(principal: Money, installment_count: u32, rate_pct: Percent) -> Self {
        SimulationRequest {
            principal,
            installment_count,
            rate_pct,
            extra_days: 0,
            monthly_index_rate_pct: Decimal::ZERO,
        }
    }

    pub fn with_extra_days(mut self, extra_days: u32) -> Self {
        self.extra_days = extra_days;
        self
    }

    pub fn with_monthly_index(mut self, monthly_index_rate_pct: Percent) -> Self {
        self.monthly_index_rate_pct = monthly_index_rate_pct;
        self
    }
}

/// Which business rules validation enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// When false ("free mode"), the rate bands and the installment ceiling
    /// are skipped. Only an administrator should be able to turn this off.
    pub enforce_rate_limits: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        ValidationPolicy {
            enforce_rate_limits: true,
        }
    }
}

impl ValidationPolicy {
    pub fn free_mode() -> Self {
        ValidationPolicy {
            enforce_rate_limits: false,
        }
    }
}

/// Distinguishes user mistakes from a misconfigured rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Input,
    Configuration,
}

/// The request field a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationField {
    Principal,
    InstallmentCount,
    RatePct,
}

/// A single rejected constraint. `message` is user-facing copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub kind: FailureKind,
    pub field: ValidationField,
    pub message: String,
}

/// A request that passed validation.
///
/// Only [`validate`] and [`validate_with_policy`] build one, which is what
/// guarantees a non-zero installment count downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRequest {
    principal: Money,
    installment_count: NonZeroU32,
    rate_pct: Percent,
    extra_days: u32,
    monthly_index_rate_pct: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    band: Option<EffectiveBand>,
}

impl ValidatedRequest {
    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn installment_count(&self) -> NonZeroU32 {
        self.installment_count
    }

    pub fn rate_pct(&self) -> Percent {
        self.rate_pct
    }

    pub fn extra_days(&self) -> u32 {
        self.extra_days
    }

    pub fn monthly_index_rate_pct(&self) -> Percent {
        self.monthly_index_rate_pct
    }

    /// Band the rate was checked against; `None` in free mode.
    pub fn band(&self) -> Option<&EffectiveBand> {
        self.band.as_ref()
    }
}

/// Result of validating a request. Never both valid and invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid(ValidatedRequest),
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            ValidationOutcome::Invalid(failure) => Some(failure),
            ValidationOutcome::Valid(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate with every business rule enforced.
pub fn validate(request: &SimulationRequest, table: &RateLimitTable) -> ValidationOutcome {
    validate_with_policy(request, table, &ValidationPolicy::default())
}

/// Validate a request against `table` under `policy`.
pub fn validate_with_policy(
    request: &SimulationRequest,
    table: &RateLimitTable,
    policy: &ValidationPolicy,
) -> ValidationOutcome {
    let outcome = run_checks(request, table, policy);
    if let ValidationOutcome::Invalid(failure) = &outcome {
        match failure.kind {
            FailureKind::Configuration => log::error!(
                "rate limit table has no band for {} installments",
                request.installment_count
            ),
            FailureKind::Input => log::debug!("simulation rejected: {}", failure.message),
        }
    }
    outcome
}

/// Hint text for the count field: the band a user must stay within.
///
/// `None` when the count has no band or is above the installment ceiling.
pub fn describe_band(installment_count: u32, table: &RateLimitTable) -> Option<String> {
    if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&installment_count) {
        return None;
    }
    let effective = table.band_for(installment_count)?;
    Some(format!(
        "for {} {}, the minimum rate is {}% and the maximum {}%",
        installment_count,
        installment_noun(installment_count),
        two_places(effective.band.min_rate_pct),
        two_places(effective.band.max_rate_pct),
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn run_checks(
    request: &SimulationRequest,
    table: &RateLimitTable,
    policy: &ValidationPolicy,
) -> ValidationOutcome {
    if request.principal <= Decimal::ZERO {
        return invalid(
            FailureKind::Input,
            ValidationField::Principal,
            "principal must be greater than zero".into(),
        );
    }

    let installment_count = match NonZeroU32::new(request.installment_count) {
        Some(n) => n,
        _ => {
            return invalid(
                FailureKind::Input,
                ValidationField::InstallmentCount,
                "installment count below minimum allowed".into(),
            )
        }
    };

    if !policy.enforce_rate_limits {
        return ValidationOutcome::Valid(accept(request, installment_count, None));
    }

    if request.installment_count > MAX_INSTALLMENTS {
        return invalid(
            FailureKind::Input,
            ValidationField::InstallmentCount,
            format!(
                "installment count exceeds maximum allowed ({MAX_INSTALLMENTS}); \
                 contact an administrator for larger simulations"
            ),
        );
    }

    let effective = match table.band_for(request.installment_count) {
        Some(effective) => effective,
        None => {
            return invalid(
                FailureKind::Configuration,
                ValidationField::InstallmentCount,
                "invalid installment count".into(),
            )
        }
    };

    if request.rate_pct < effective.band.min_rate_pct {
        return invalid(
            FailureKind::Input,
            ValidationField::RatePct,
            bound_message(request.installment_count, "minimum", effective.band.min_rate_pct),
        );
    }

    if request.rate_pct > effective.band.max_rate_pct {
        return invalid(
            FailureKind::Input,
            ValidationField::RatePct,
            bound_message(request.installment_count, "maximum", effective.band.max_rate_pct),
        );
    }

    ValidationOutcome::Valid(accept(request, installment_count, Some(effective)))
}

fn accept(
    request: &SimulationRequest,
    installment_count: NonZeroU32,
    band: Option<EffectiveBand>,
) -> ValidatedRequest {
    ValidatedRequest {
        principal: request.principal,
        installment_count,
        rate_pct: request.rate_pct,
        extra_days: request.extra_days,
        monthly_index_rate_pct: request.monthly_index_rate_pct,
        band,
    }
}

fn invalid(kind: FailureKind, field: ValidationField, message: String) -> ValidationOutcome {
    ValidationOutcome::Invalid(ValidationFailure {
        kind,
        field,
        message,
    })
}

fn bound_message(installment_count: u32, which: &str, bound: Percent) -> String {
    format!(
        "for {} {}, the {} allowed rate is {}%; \
         for rates outside the specified limits, contact an administrator",
        installment_count,
        installment_noun(installment_count),
        which,
        two_places(bound),
    )
}

fn installment_noun(installment_count: u32) -> &'static str {
    if installment_count == 1 {
        "installment"
    } else {
        "installments"
    }
}

fn two_places(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::{BandSource, RateLimitEntry};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn message_of(outcome: &ValidationOutcome) -> &str {
        &outcome.failure().expect("expected a rejection").message
    }

    #[test]
    fn test_non_positive_principal_rejected_first() {
        let table = RateLimitTable::standard();
        // Count and rate are also invalid; principal must win.
        let req = SimulationRequest::new(dec!(0), 0, dec!(500));
        let outcome = validate(&req, &table);
        assert_eq!(message_of(&outcome), "principal must be greater than zero");
        assert_eq!(outcome.failure().unwrap().field, ValidationField::Principal);

        let negative = SimulationRequest::new(dec!(-10), 3, dec!(20));
        assert_eq!(
            message_of(&validate(&negative, &table)),
            "principal must be greater than zero"
        );
    }

    #[test]
    fn test_zero_installments_rejected() {
        let req = SimulationRequest::new(dec!(1000), 0, dec!(20));
        let outcome = validate(&req, &RateLimitTable::standard());
        assert_eq!(message_of(&outcome), "installment count below minimum allowed");
    }

    #[test]
    fn test_sixteen_installments_rejected() {
        let req = SimulationRequest::new(dec!(1000), 16, dec!(11.5));
        let outcome = validate(&req, &RateLimitTable::standard());
        assert_eq!(
            message_of(&outcome),
            "installment count exceeds maximum allowed (15); \
             contact an administrator for larger simulations"
        );
    }

    #[test]
    fn test_rate_below_minimum_singular_wording() {
        let req = SimulationRequest::new(dec!(1000), 1, dec!(14.99));
        let outcome = validate(&req, &RateLimitTable::standard());
        assert_eq!(
            message_of(&outcome),
            "for 1 installment, the minimum allowed rate is 15.00%; \
             for rates outside the specified limits, contact an administrator"
        );
    }

    #[test]
    fn test_rate_above_maximum_plural_wording() {
        let req = SimulationRequest::new(dec!(1000), 8, dec!(17.01));
        let outcome = validate(&req, &RateLimitTable::standard());
        assert_eq!(
            message_of(&outcome),
            "for 8 installments, the maximum allowed rate is 17.00%; \
             for rates outside the specified limits, contact an administrator"
        );
        assert_eq!(outcome.failure().unwrap().field, ValidationField::RatePct);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let table = RateLimitTable::standard();
        for n in 1..=15 {
            let band = table.band_for(n).unwrap().band;
            let at_min = SimulationRequest::new(dec!(1000), n, band.min_rate_pct);
            let at_max = SimulationRequest::new(dec!(1000), n, band.max_rate_pct);
            assert!(validate(&at_min, &table).is_valid(), "min for {n}");
            assert!(validate(&at_max, &table).is_valid(), "max for {n}");
        }
    }

    #[test]
    fn test_valid_request_carries_fields_and_band() {
        let req = SimulationRequest::new(dec!(2500), 15, dec!(11.80))
            .with_extra_days(4)
            .with_monthly_index(dec!(0.5));
        match validate(&req, &RateLimitTable::standard()) {
            ValidationOutcome::Valid(v) => {
                assert_eq!(v.principal(), dec!(2500));
                assert_eq!(v.installment_count().get(), 15);
                assert_eq!(v.rate_pct(), dec!(11.80));
                assert_eq!(v.extra_days(), 4);
                assert_eq!(v.monthly_index_rate_pct(), dec!(0.5));
                assert_eq!(v.band().unwrap().source, BandSource::Default);
            }
            ValidationOutcome::Invalid(f) => panic!("unexpected rejection: {}", f.message),
        }
    }

    #[test]
    fn test_override_band_used_for_validation() {
        let table = RateLimitTable::standard()
            .with_overrides(&[RateLimitEntry {
                installment_count: 3,
                min_rate_pct: dec!(5),
                max_rate_pct: dec!(8),
            }])
            .unwrap();

        // 20% is fine under the default band for 3 but not the override
        let req = SimulationRequest::new(dec!(1000), 3, dec!(20));
        assert_eq!(
            message_of(&validate(&req, &table)),
            "for 3 installments, the maximum allowed rate is 8.00%; \
             for rates outside the specified limits, contact an administrator"
        );
        let ok = SimulationRequest::new(dec!(1000), 3, dec!(6));
        assert!(validate(&ok, &table).is_valid());
    }

    #[test]
    fn test_missing_band_is_configuration_failure() {
        let table = RateLimitTable::with_defaults(&[RateLimitEntry {
            installment_count: 1,
            min_rate_pct: dec!(10),
            max_rate_pct: dec!(20),
        }])
        .unwrap();
        let req = SimulationRequest::new(dec!(1000), 2, dec!(15));
        let outcome = validate(&req, &table);
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Configuration);
        assert_eq!(failure.message, "invalid installment count");
    }

    #[test]
    fn test_free_mode_skips_bands_and_ceiling() {
        let table = RateLimitTable::standard();
        let policy = ValidationPolicy::free_mode();

        let req = SimulationRequest::new(dec!(1000), 24, dec!(3));
        let outcome = validate_with_policy(&req, &table, &policy);
        match outcome {
            ValidationOutcome::Valid(v) => assert!(v.band().is_none()),
            ValidationOutcome::Invalid(f) => panic!("unexpected rejection: {}", f.message),
        }

        // Principal and the structural count check still apply
        let zero = SimulationRequest::new(dec!(0), 24, dec!(3));
        assert!(!validate_with_policy(&zero, &table, &policy).is_valid());
        let none = SimulationRequest::new(dec!(1000), 0, dec!(3));
        assert!(!validate_with_policy(&none, &table, &policy).is_valid());
    }

    #[test]
    fn test_describe_band() {
        let table = RateLimitTable::standard();
        assert_eq!(
            describe_band(1, &table).unwrap(),
            "for 1 installment, the minimum rate is 15.00% and the maximum 100.00%"
        );
        assert_eq!(
            describe_band(14, &table).unwrap(),
            "for 14 installments, the minimum rate is 11.80% and the maximum 12.19%"
        );
        assert!(describe_band(0, &table).is_none());
        assert!(describe_band(16, &table).is_none());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let req = SimulationRequest::new(dec!(1000), 16, dec!(12));
        let json = serde_json::to_value(validate(&req, &RateLimitTable::standard())).unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["kind"], "input");
        assert_eq!(json["field"], "installment_count");
    }
}
