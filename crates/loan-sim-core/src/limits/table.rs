//! Interest-rate bands per installment count.
//!
//! The default table is a compile-time constant. Deployments may layer an
//! administrator-maintained override table on top of it; an override for a
//! given count replaces the default band for that count entirely.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LoanSimError;
use crate::types::Percent;
use crate::LoanSimResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest installment count a simulation may request.
pub const MIN_INSTALLMENTS: u32 = 1;
/// Largest installment count allowed without administrator involvement.
pub const MAX_INSTALLMENTS: u32 = 15;

/// (installment count, min %, max %)
const DEFAULT_BANDS: [(u32, Decimal, Decimal); 15] = [
    (1, dec!(15.00), dec!(100.00)),
    (2, dec!(15.00), dec!(100.00)),
    (3, dec!(15.00), dec!(30.00)),
    (4, dec!(15.00), dec!(24.00)),
    (5, dec!(15.00), dec!(22.00)),
    (6, dec!(15.00), dec!(20.00)),
    (7, dec!(14.75), dec!(18.00)),
    (8, dec!(14.36), dec!(17.00)),
    (9, dec!(13.92), dec!(16.00)),
    (10, dec!(13.47), dec!(15.00)),
    (11, dec!(13.03), dec!(14.00)),
    (12, dec!(12.60), dec!(13.00)),
    (13, dec!(12.19), dec!(12.60)),
    (14, dec!(11.80), dec!(12.19)),
    (15, dec!(11.43), dec!(11.80)),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Inclusive [min, max] interest-rate band, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBand {
    pub min_rate_pct: Percent,
    pub max_rate_pct: Percent,
}

impl RateBand {
    pub fn contains(&self, rate_pct: Percent) -> bool {
        rate_pct >= self.min_rate_pct && rate_pct <= self.max_rate_pct
    }
}

/// One row of a rate-limit table, keyed by installment count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    pub installment_count: u32,
    pub min_rate_pct: Percent,
    pub max_rate_pct: Percent,
}

impl RateLimitEntry {
    pub fn band(&self) -> RateBand {
        RateBand {
            min_rate_pct: self.min_rate_pct,
            max_rate_pct: self.max_rate_pct,
        }
    }
}

/// Where the band in effect for a count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSource {
    Default,
    Override,
}

/// A band together with its origin, as seen by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveBand {
    pub installment_count: u32,
    pub band: RateBand,
    pub source: BandSource,
}

/// Default bands plus administrator overrides.
///
/// Validation only ever reads a table. Edits go through [`set_override`]
/// and friends on an owned copy; see [`crate::limits::RateLimitStore`] for
/// sharing a table between threads.
///
/// [`set_override`]: RateLimitTable::set_override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitTable {
    defaults: BTreeMap<u32, RateBand>,
    #[serde(default)]
    overrides: BTreeMap<u32, RateBand>,
}

impl Default for RateLimitTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl RateLimitTable {
    /// The fifteen built-in bands with no overrides.
    pub fn standard() -> Self {
        let defaults = DEFAULT_BANDS
            .iter()
            .map(|&(n, min, max)| {
                (
                    n,
                    RateBand {
                        min_rate_pct: min,
                        max_rate_pct: max,
                    },
                )
            })
            .collect();
        RateLimitTable {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    /// Build a table from an explicit set of default entries.
    ///
    /// Entries must be individually well-formed, but the set does not have
    /// to cover every count from 1 to 15. A gap surfaces at validation time
    /// as a configuration failure.
    pub fn with_defaults(entries: &[RateLimitEntry]) -> LoanSimResult<Self> {
        let mut defaults = BTreeMap::new();
        for entry in entries {
            validate_entry(entry)?;
            if defaults.insert(entry.installment_count, entry.band()).is_some() {
                return Err(LoanSimError::InvalidInput {
                    field: "installment_count".into(),
                    reason: format!(
                        "Duplicate default entry for {} installments",
                        entry.installment_count
                    ),
                });
            }
        }
        Ok(RateLimitTable {
            defaults,
            overrides: BTreeMap::new(),
        })
    }

    /// Apply a batch of overrides, failing on the first malformed entry.
    pub fn with_overrides(mut self, entries: &[RateLimitEntry]) -> LoanSimResult<Self> {
        for entry in entries {
            self.set_override(*entry)?;
        }
        Ok(self)
    }

    /// Band in effect for `installment_count`: override first, then default.
    pub fn band_for(&self, installment_count: u32) -> Option<EffectiveBand> {
        if let Some(band) = self.overrides.get(&installment_count) {
            return Some(EffectiveBand {
                installment_count,
                band: *band,
                source: BandSource::Override,
            });
        }
        self.defaults
            .get(&installment_count)
            .map(|band| EffectiveBand {
                installment_count,
                band: *band,
                source: BandSource::Default,
            })
    }

    /// Install or replace the override for one installment count.
    ///
    /// Rejected (and the table left unchanged) when the count is outside
    /// 1..=15, the minimum is negative, or the maximum is below the minimum.
    pub fn set_override(&mut self, entry: RateLimitEntry) -> LoanSimResult<()> {
        if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&entry.installment_count) {
            return Err(LoanSimError::InvalidInput {
                field: "installment_count".into(),
                reason: format!(
                    "Overrides are only accepted for {} to {} installments",
                    MIN_INSTALLMENTS, MAX_INSTALLMENTS
                ),
            });
        }
        validate_entry(&entry)?;

        log::info!(
            "rate limit override for {} installments: {}% to {}%",
            entry.installment_count,
            entry.min_rate_pct,
            entry.max_rate_pct
        );
        self.overrides.insert(entry.installment_count, entry.band());
        Ok(())
    }

    /// Drop the override for one count, returning the removed band.
    pub fn remove_override(&mut self, installment_count: u32) -> Option<RateBand> {
        self.overrides.remove(&installment_count)
    }

    /// Restore the default bands for every count.
    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// Override entries, ordered by installment count.
    pub fn override_entries(&self) -> Vec<RateLimitEntry> {
        self.overrides
            .iter()
            .map(|(&n, band)| to_entry(n, band))
            .collect()
    }

    /// Every count that has a band, with the band validation would use.
    pub fn effective_bands(&self) -> Vec<EffectiveBand> {
        let mut counts: Vec<u32> = self
            .defaults
            .keys()
            .chain(self.overrides.keys())
            .copied()
            .collect();
        counts.sort_unstable();
        counts.dedup();
        counts
            .into_iter()
            .filter_map(|n| self.band_for(n))
            .collect()
    }
}

fn to_entry(installment_count: u32, band: &RateBand) -> RateLimitEntry {
    RateLimitEntry {
        installment_count,
        min_rate_pct: band.min_rate_pct,
        max_rate_pct: band.max_rate_pct,
    }
}

fn validate_entry(entry: &RateLimitEntry) -> LoanSimResult<()> {
    if entry.min_rate_pct < Decimal::ZERO {
        return Err(LoanSimError::InvalidInput {
            field: "min_rate_pct".into(),
            reason: "Minimum rate cannot be negative".into(),
        });
    }
    if entry.max_rate_pct < entry.min_rate_pct {
        return Err(LoanSimError::InvalidInput {
            field: "max_rate_pct".into(),
            reason: "Maximum rate cannot be below the minimum rate".into(),
        });
    }
    Ok(())
}
