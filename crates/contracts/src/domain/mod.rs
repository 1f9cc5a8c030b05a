pub mod a001_recommended_price;
pub mod a002_marketplace_credentials;
pub mod a003_listing;
