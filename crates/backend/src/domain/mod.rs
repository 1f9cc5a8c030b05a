pub mod a001_recommended_price;
pub mod a002_marketplace_credentials;
