//! Payment schedule handed to report generators.
//!
//! The generator only renders what it receives here: one row per
//! installment with its due date, plus the loan terms and the total.

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanSimError;
use crate::limits::RateLimitTable;
use crate::simulation::{
    compute_for, regular_first_due_date, validate_with_policy, SimulationRequest,
    SimulationResult, ValidatedRequest, ValidationFailure, ValidationOutcome, ValidationPolicy,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::LoanSimResult;

/// One row of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub number: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
}

/// Loan terms plus every installment's due date and amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub simulation_date: NaiveDate,
    pub principal: Money,
    pub rate_pct: Percent,
    pub installment_count: u32,
    pub extra_days: u32,
    pub installment_amount: Money,
    pub installments: Vec<ScheduledInstallment>,
    pub total_payable: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleOutcome {
    Accepted(PaymentSchedule),
    Rejected(ValidationFailure),
}

/// Lay out due dates for an already-computed simulation.
///
/// The first installment falls one regular period (30 days) after the
/// simulation date, pushed back by any pro-rata days; the rest follow at
/// calendar-month intervals from it.
pub fn build_schedule(
    request: &ValidatedRequest,
    result: &SimulationResult,
    simulation_date: NaiveDate,
) -> LoanSimResult<PaymentSchedule> {
    let first_due = regular_first_due_date(simulation_date)?
        .checked_add_signed(Duration::days(i64::from(request.extra_days())))
        .ok_or_else(|| LoanSimError::DateError("first due date out of range".into()))?;

    let count = request.installment_count().get();
    // Bounds the row count by the calendar before anything is allocated.
    first_due
        .checked_add_months(Months::new(count - 1))
        .ok_or_else(|| {
            LoanSimError::DateError(format!(
                "{count} monthly installments run past the calendar"
            ))
        })?;

    let mut installments = Vec::with_capacity(count as usize);
    for i in 0..count {
        let due_date = first_due
            .checked_add_months(Months::new(i))
            .ok_or_else(|| LoanSimError::DateError(format!("due date of installment {}", i + 1)))?;
        installments.push(ScheduledInstallment {
            number: i + 1,
            due_date,
            amount: result.installment_amount_rounded,
        });
    }

    Ok(PaymentSchedule {
        simulation_date,
        principal: request.principal(),
        rate_pct: request.rate_pct(),
        installment_count: count,
        extra_days: request.extra_days(),
        installment_amount: result.installment_amount_rounded,
        installments,
        total_payable: result.total_payable,
        total_interest: result.total_interest,
    })
}

/// Validate, compute and schedule in one step.
pub fn simulate_schedule(
    request: &SimulationRequest,
    table: &RateLimitTable,
    policy: &ValidationPolicy,
    simulation_date: NaiveDate,
) -> LoanSimResult<ComputationOutput<ScheduleOutcome>> {
    let start = Instant::now();

    let outcome = match validate_with_policy(request, table, policy) {
        ValidationOutcome::Invalid(failure) => ScheduleOutcome::Rejected(failure),
        ValidationOutcome::Valid(validated) => {
            let result = compute_for(&validated)?;
            ScheduleOutcome::Accepted(build_schedule(&validated, &result, simulation_date)?)
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equal installments at monthly intervals from the first due date",
        request,
        Vec::new(),
        elapsed,
        outcome,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::validate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn validated(request: &SimulationRequest) -> ValidatedRequest {
        match validate(request, &RateLimitTable::standard()) {
            ValidationOutcome::Valid(v) => v,
            ValidationOutcome::Invalid(f) => panic!("unexpected rejection: {}", f.message),
        }
    }

    #[test]
    fn test_schedule_dates_and_amounts() {
        let request = SimulationRequest::new(dec!(1000), 3, dec!(20));
        let v = validated(&request);
        let result = compute_for(&v).unwrap();
        let schedule = build_schedule(&v, &result, date(2025, 1, 1)).unwrap();

        let dates: Vec<NaiveDate> = schedule.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(dates, vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31)]);

        // 1000 × 1.2³ / 3 = 576
        for row in &schedule.installments {
            assert_eq!(row.amount, dec!(576));
        }
        assert_eq!(schedule.total_payable, dec!(1728));
        assert_eq!(schedule.total_interest, dec!(728));
    }

    #[test]
    fn test_extra_days_push_first_due_date() {
        let request = SimulationRequest::new(dec!(1000), 1, dec!(15)).with_extra_days(15);
        let v = validated(&request);
        let result = compute_for(&v).unwrap();
        let schedule = build_schedule(&v, &result, date(2025, 1, 15)).unwrap();

        assert_eq!(schedule.installments.len(), 1);
        assert_eq!(schedule.installments[0].due_date, date(2025, 3, 1));
        assert_eq!(schedule.installment_amount, dec!(1236.25));
    }

    #[test]
    fn test_free_mode_huge_count_is_a_date_error() {
        let request = SimulationRequest::new(dec!(1000), u32::MAX, dec!(0));
        let err = simulate_schedule(
            &request,
            &RateLimitTable::standard(),
            &ValidationPolicy::free_mode(),
            date(2025, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, LoanSimError::DateError(_)));
    }

    #[test]
    fn test_simulate_schedule_rejected() {
        let request = SimulationRequest::new(dec!(1000), 3, dec!(31));
        let out = simulate_schedule(
            &request,
            &RateLimitTable::standard(),
            &ValidationPolicy::default(),
            date(2025, 1, 1),
        )
        .unwrap();
        assert!(matches!(out.result, ScheduleOutcome::Rejected(_)));
    }
}
