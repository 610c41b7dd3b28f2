//! Shared, copy-on-write holder for the rate-limit table in effect.

use std::sync::{Arc, RwLock};

use super::table::RateLimitTable;
use crate::LoanSimResult;

/// Single-writer / many-readers store for a [`RateLimitTable`].
///
/// Readers take an `Arc` snapshot and validate against it without holding
/// the lock. Writers edit a private copy and swap it in whole, so a snapshot
/// is never observed half-updated.
#[derive(Debug, Default)]
pub struct RateLimitStore {
    current: RwLock<Arc<RateLimitTable>>,
}

impl RateLimitStore {
    pub fn new(table: RateLimitTable) -> Self {
        RateLimitStore {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// The table in effect right now.
    pub fn snapshot(&self) -> Arc<RateLimitTable> {
        // The guarded value is a single Arc assignment, so a poisoned lock
        // still holds a complete table.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in an entirely new table.
    pub fn replace(&self, table: RateLimitTable) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(table);
    }

    /// Apply an edit to a copy of the current table and publish it.
    ///
    /// If `edit` fails the published table is left as it was.
    pub fn update<F>(&self, edit: F) -> LoanSimResult<Arc<RateLimitTable>>
    where
        F: FnOnce(&mut RateLimitTable) -> LoanSimResult<()>,
    {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let mut next = RateLimitTable::clone(&guard);
        edit(&mut next)?;
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        Ok(next)
    }
}
