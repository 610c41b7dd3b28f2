pub mod store;
pub mod table;

pub use store::RateLimitStore;
pub use table::{
    BandSource, EffectiveBand, RateBand, RateLimitEntry, RateLimitTable, MAX_INSTALLMENTS,
    MIN_INSTALLMENTS,
};
