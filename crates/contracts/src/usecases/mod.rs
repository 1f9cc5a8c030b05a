pub mod common;
pub mod u501_reconcile_prices;
