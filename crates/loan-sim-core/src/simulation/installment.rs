//! Installment amount: compound interest over the full term, split evenly.
//!
//! `amount = principal' × (1 + r)^n / n`, where `principal'` is the
//! principal after the optional pro-rata and price-index adjustments:
//!
//! - pro-rata: `× (1 + r / 30 × extra_days)` (linear daily rate, 30-day month)
//! - index:    `× (1 + i)^n`
//!
//! This is not an annuity schedule. Every installment carries the same
//! nominal amount.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Instant;

use super::validation::{
    validate_with_policy, SimulationRequest, ValidatedRequest, ValidationFailure,
    ValidationOutcome, ValidationPolicy,
};
use crate::error::LoanSimError;
use crate::limits::RateLimitTable;
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::LoanSimResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const PERCENT: Decimal = dec!(100);
/// Day-count convention for converting the period rate to a daily rate.
const DAYS_PER_PERIOD: Decimal = dec!(30);

const METHODOLOGY: &str =
    "Compound interest over the full term divided evenly across installments";

// ---------------------------------------------------------------------------
// Output Types
// ---------------------------------------------------------------------------

/// Installment amount and the totals derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Unrounded amount of each installment.
    pub installment_amount: Money,
    /// Installment rounded to cents, as shown to the user.
    pub installment_amount_rounded: Money,
    pub installment_count: u32,
    /// Rounded installment × count.
    pub total_payable: Money,
    /// Total payable less principal.
    pub total_interest: Money,
    /// Total interest as a percentage of principal.
    pub interest_margin_pct: Percent,
}

/// What a simulation produced: a result, or the reason it was refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulationOutcome {
    Accepted(SimulationResult),
    Rejected(ValidationFailure),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amount of each installment.
///
/// The only failure is decimal overflow, which cannot happen for requests
/// that pass validation under the standard rate table.
pub fn compute_installment(
    principal: Money,
    rate_pct: Percent,
    installment_count: NonZeroU32,
    extra_days: u32,
    monthly_index_rate_pct: Percent,
) -> LoanSimResult<Money> {
    let rate: Rate = rate_pct / PERCENT;
    let n = u64::from(installment_count.get());
    let mut adjusted = principal;

    if extra_days > 0 {
        let daily = rate / DAYS_PER_PERIOD;
        let pro_rata = checked_mul(daily, Decimal::from(extra_days), "daily rate")?
            .checked_add(Decimal::ONE)
            .ok_or_else(|| overflow("pro-rata adjustment"))?;
        adjusted = checked_mul(adjusted, pro_rata, "pro-rata adjustment")?;
    }

    if monthly_index_rate_pct > Decimal::ZERO {
        let index_growth = (Decimal::ONE + monthly_index_rate_pct / PERCENT)
            .checked_powu(n)
            .ok_or_else(|| overflow("price-index compounding"))?;
        adjusted = checked_mul(adjusted, index_growth, "price-index adjustment")?;
    }

    let growth = (Decimal::ONE + rate)
        .checked_powu(n)
        .ok_or_else(|| overflow("interest compounding"))?;
    let total = checked_mul(adjusted, growth, "compounded total")?;

    Ok(total / Decimal::from(installment_count.get()))
}

/// Compute the installment for a request that already passed validation.
pub fn compute_for(request: &ValidatedRequest) -> LoanSimResult<SimulationResult> {
    let installment = compute_installment(
        request.principal(),
        request.rate_pct(),
        request.installment_count(),
        request.extra_days(),
        request.monthly_index_rate_pct(),
    )?;
    summarize(request.principal(), request.installment_count(), installment)
}

/// Validate, then compute, and wrap the outcome in the standard envelope.
///
/// Rejections come back as [`SimulationOutcome::Rejected`], not as errors.
pub fn simulate(
    request: &SimulationRequest,
    table: &RateLimitTable,
    policy: &ValidationPolicy,
) -> LoanSimResult<ComputationOutput<SimulationOutcome>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let outcome = match validate_with_policy(request, table, policy) {
        ValidationOutcome::Invalid(failure) => SimulationOutcome::Rejected(failure),
        ValidationOutcome::Valid(validated) => {
            collect_warnings(request, policy, &mut warnings);
            let result = compute_for(&validated)?;
            log::debug!(
                "simulated {} x {} at {}%: {}",
                result.installment_count,
                result.installment_amount_rounded,
                request.rate_pct,
                result.total_payable
            );
            SimulationOutcome::Accepted(result)
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(METHODOLOGY, request, warnings, elapsed, outcome))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn summarize(
    principal: Money,
    installment_count: NonZeroU32,
    installment: Money,
) -> LoanSimResult<SimulationResult> {
    let count = Decimal::from(installment_count.get());
    let rounded = round_cents(installment);
    let total_payable = checked_mul(rounded, count, "total payable")?;
    let total_interest = total_payable - principal;
    let interest_margin_pct = total_interest
        .checked_div(principal)
        .and_then(|ratio| ratio.checked_mul(PERCENT))
        .ok_or_else(|| overflow("interest margin"))?
        .round_dp(2);

    Ok(SimulationResult {
        installment_amount: installment,
        installment_amount_rounded: rounded,
        installment_count: installment_count.get(),
        total_payable,
        total_interest,
        interest_margin_pct,
    })
}

fn collect_warnings(
    request: &SimulationRequest,
    policy: &ValidationPolicy,
    warnings: &mut Vec<String>,
) {
    if !policy.enforce_rate_limits {
        warnings.push("Rate limits not enforced (free mode)".into());
    }
    if request.extra_days > 0 {
        warnings.push(format!(
            "Principal adjusted pro-rata for {} extra days",
            request.extra_days
        ));
    }
    if request.monthly_index_rate_pct > Decimal::ZERO {
        warnings.push(format!(
            "Price-index adjustment of {}% per period applied",
            request.monthly_index_rate_pct
        ));
    } else if request.monthly_index_rate_pct < Decimal::ZERO {
        warnings.push("Negative price-index rate ignored".into());
    }
}

fn checked_mul(a: Decimal, b: Decimal, context: &str) -> LoanSimResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

fn overflow(context: &str) -> LoanSimError {
    LoanSimError::ArithmeticOverflow {
        context: context.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn n(count: u32) -> NonZeroU32 {
        NonZeroU32::new(count).unwrap()
    }

    fn plain(principal: Decimal, rate_pct: Decimal, count: u32) -> Decimal {
        compute_installment(principal, rate_pct, n(count), 0, Decimal::ZERO).unwrap()
    }

    #[test]
    fn test_single_installment() {
        assert_eq!(plain(dec!(1000), dec!(15), 1), dec!(1150));
    }

    #[test]
    fn test_two_installments() {
        // 1000 × 1.10² / 2
        assert_eq!(plain(dec!(1000), dec!(10), 2), dec!(605));
    }

    #[test]
    fn test_five_installments_at_twenty_percent() {
        // 5000 × 1.2^5 / 5 = 1000 × 2.48832
        let amount = plain(dec!(5000), dec!(20), 5);
        assert_eq!(round_cents(amount), dec!(2488.32));
    }

    #[test]
    fn test_zero_rate_divides_principal() {
        assert_eq!(plain(dec!(1000), dec!(0), 5), dec!(200));
    }

    #[test]
    fn test_pro_rata_single_installment() {
        // 1000 × (1 + 0.15/30 × 15) = 1075; 1075 × 1.15 = 1236.25
        let amount =
            compute_installment(dec!(1000), dec!(15), n(1), 15, Decimal::ZERO).unwrap();
        assert_eq!(amount, dec!(1236.25));
    }

    #[test]
    fn test_index_adjustment_compounds_over_term() {
        // 1000 × 1.01² × 1.10² / 2 = 1020.1 × 1.21 / 2
        let amount = compute_installment(dec!(1000), dec!(10), n(2), 0, dec!(1)).unwrap();
        assert_eq!(amount, dec!(617.1605));
    }

    #[test]
    fn test_negative_index_is_ignored() {
        let with_negative =
            compute_installment(dec!(1000), dec!(10), n(2), 0, dec!(-3)).unwrap();
        assert_eq!(with_negative, dec!(605));
    }

    #[test]
    fn test_monotonic_in_rate() {
        let mut previous = Decimal::ZERO;
        for step in 0..=40 {
            let rate = Decimal::from(step) * dec!(2.5);
            let amount = plain(dec!(1000), rate, 6);
            assert!(amount > previous, "not increasing at {rate}%");
            previous = amount;
        }
    }

    #[test]
    fn test_idempotent() {
        let a = compute_installment(dec!(1234.56), dec!(13.47), n(10), 7, dec!(0.4)).unwrap();
        let b = compute_installment(dec!(1234.56), dec!(13.47), n(10), 7, dec!(0.4)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_overflow_reported_not_panicked() {
        let err = compute_installment(dec!(1_000_000_000), dec!(900), n(40), 0, Decimal::ZERO)
            .unwrap_err();
        assert!(matches!(err, LoanSimError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_interest_margin_overflow_reported_not_panicked() {
        // Passes validation; the margin over a near-zero principal does not fit.
        let req = SimulationRequest::new(dec!(0.00000000000000000001), 15, dec!(11.80))
            .with_monthly_index(dec!(6000));
        let err = simulate(&req, &RateLimitTable::standard(), &ValidationPolicy::default())
            .unwrap_err();
        match err {
            LoanSimError::ArithmeticOverflow { context } => assert_eq!(context, "interest margin"),
            other => panic!("Expected ArithmeticOverflow, got {other:?}"),
        }
    }

    #[test]
    fn test_simulate_accepted_totals() {
        let req = SimulationRequest::new(dec!(1000), 2, dec!(15));
        let out = simulate(&req, &RateLimitTable::standard(), &ValidationPolicy::default())
            .unwrap();
        match out.result {
            SimulationOutcome::Accepted(r) => {
                // 1000 × 1.3225 / 2 = 661.25
                assert_eq!(r.installment_amount_rounded, dec!(661.25));
                assert_eq!(r.total_payable, dec!(1322.50));
                assert_eq!(r.total_interest, dec!(322.50));
                assert_eq!(r.interest_margin_pct, dec!(32.25));
            }
            SimulationOutcome::Rejected(f) => panic!("unexpected rejection: {}", f.message),
        }
        assert!(out.warnings.is_empty());
        assert_eq!(out.methodology, METHODOLOGY);
    }

    #[test]
    fn test_simulate_rejection_is_data() {
        let req = SimulationRequest::new(dec!(1000), 16, dec!(12));
        let out = simulate(&req, &RateLimitTable::standard(), &ValidationPolicy::default())
            .unwrap();
        assert!(matches!(out.result, SimulationOutcome::Rejected(_)));
    }

    #[test]
    fn test_simulate_warnings_for_adjustments() {
        let req = SimulationRequest::new(dec!(1000), 1, dec!(15))
            .with_extra_days(15)
            .with_monthly_index(dec!(0.5));
        let out = simulate(&req, &RateLimitTable::standard(), &ValidationPolicy::free_mode())
            .unwrap();
        assert_eq!(out.warnings.len(), 3);
    }
}
