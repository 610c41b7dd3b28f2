//! Helpers that turn user-facing settings into engine inputs.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::LoanSimError;
use crate::types::Percent;
use crate::LoanSimResult;

/// Days between a simulation and its regular first due date.
pub const REGULAR_FIRST_DUE_DAYS: i64 = 30;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Regular first due date: the simulation date plus one 30-day period.
pub fn regular_first_due_date(simulation_date: NaiveDate) -> LoanSimResult<NaiveDate> {
    simulation_date
        .checked_add_signed(Duration::days(REGULAR_FIRST_DUE_DAYS))
        .ok_or_else(|| {
            LoanSimError::DateError(format!("{simulation_date} + {REGULAR_FIRST_DUE_DAYS} days"))
        })
}

/// Pro-rata days implied by a requested first due date.
///
/// Whole days past the regular first due date. A requested date on or
/// before the regular one yields zero.
pub fn extra_days_until(
    simulation_date: NaiveDate,
    requested_first_due: NaiveDate,
) -> LoanSimResult<u32> {
    let regular = regular_first_due_date(simulation_date)?;
    let days = (requested_first_due - regular).num_days();
    if days <= 0 {
        return Ok(0);
    }
    u32::try_from(days).map_err(|_| LoanSimError::InvalidInput {
        field: "first_due_date".into(),
        reason: format!("{days} extra days is out of range"),
    })
}

/// Monthly index rate from a yearly figure (simple division by 12).
pub fn monthly_index_from_annual(annual_pct: Percent) -> Percent {
    annual_pct / MONTHS_PER_YEAR
}
