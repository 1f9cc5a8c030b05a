pub mod repository;
pub mod service;
pub mod xlsx_import;

pub use repository::PriceTableStore;
pub use service::{parse_price, LoadOutcome, PriceTable};
