pub mod response;

pub use response::{ComparisonResult, ConnectionProbeResult, ListingSource, Report, ReportStats};

use crate::usecases::common::UseCaseMetadata;

pub struct ReconcilePrices;

impl UseCaseMetadata for ReconcilePrices {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "reconcile_prices"
    }

    fn display_name() -> &'static str {
        "Сверка цен с маркетплейсами"
    }

    fn description() -> &'static str {
        "Сравнение рекомендованных цен с ценами товаров на Ozon, Wildberries и Яндекс Маркете"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(ReconcilePrices::full_name(), "u501_reconcile_prices");
    }
}
