pub mod executor;

pub use executor::{compare_listings, ReconcileError, ReconcileExecutor};
