use contracts::domain::a001_recommended_price::aggregate::RecommendedPriceEntry;
use std::collections::HashMap;

/// Сырая строка загруженной таблицы: (ячейка артикула, ячейка цены)
pub type RawRow = (Option<String>, Option<String>);

/// Таблица рекомендованных цен: артикул -> цена.
///
/// Порядок записей совпадает с порядком строк в файле; повторный артикул
/// перезаписывает цену на месте.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    entries: Vec<RecommendedPriceEntry>,
    index: HashMap<String, usize>,
}

/// Итог разбора загруженных строк
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: PriceTable,
    /// Количество уникальных артикулов в таблице
    pub loaded: usize,
    /// Пропущенные строки (пустой артикул или невалидная цена)
    pub skipped: usize,
}

impl PriceTable {
    /// Построить таблицу из строк загруженного файла.
    ///
    /// Первая строка — заголовок и пропускается всегда. Строка без артикула
    /// или с пустой/невалидной ценой пропускается с предупреждением в лог,
    /// остальные строки продолжают обрабатываться.
    pub fn load<I>(rows: I) -> LoadOutcome
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut table = PriceTable::default();
        let mut skipped = 0;

        for (row_idx, (article_cell, price_cell)) in rows.into_iter().enumerate().skip(1) {
            let row_number = row_idx + 1;

            let article = article_cell
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            if article.is_empty() {
                tracing::warn!("Row {}: empty article, skipped", row_number);
                skipped += 1;
                continue;
            }

            let raw_price = price_cell.as_deref().map(str::trim).unwrap_or_default();
            if raw_price.is_empty() {
                tracing::warn!(
                    "Row {}: empty price for article '{}', skipped",
                    row_number,
                    article
                );
                skipped += 1;
                continue;
            }

            match parse_price(raw_price) {
                Some(price) => table.insert(article, price),
                None => {
                    tracing::warn!(
                        "Row {}: invalid price '{}' for article '{}', skipped",
                        row_number,
                        raw_price,
                        article
                    );
                    skipped += 1;
                }
            }
        }

        LoadOutcome {
            loaded: table.len(),
            table,
            skipped,
        }
    }

    pub fn insert(&mut self, article: &str, recommended_price: f64) {
        let article = article.trim();
        match self.index.get(article) {
            Some(&pos) => self.entries[pos].recommended_price = recommended_price,
            None => {
                self.index.insert(article.to_string(), self.entries.len());
                self.entries.push(RecommendedPriceEntry {
                    article: article.to_string(),
                    recommended_price,
                });
            }
        }
    }

    /// Рекомендованная цена артикула
    pub fn get(&self, article: &str) -> Option<f64> {
        self.index
            .get(article.trim())
            .map(|&pos| self.entries[pos].recommended_price)
    }

    pub fn entries(&self) -> &[RecommendedPriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Разбор цены из ячейки таблицы.
///
/// Пробелы (в том числе неразрывные) считаются разделителями тысяч.
/// Если в числе есть и запятая, и точка, десятичным разделителем считается
/// последний из них: "1,234.50" и "1.234,50" -> 1234.5. Повторяющийся
/// разделитель одного вида — разделитель тысяч: "1.234.567" -> 1234567.
/// Одиночная запятая или точка — десятичный разделитель: "50,5" -> 50.5.
/// Пустые, отрицательные, нечисловые и неоднозначные ("1,2.3.4") значения
/// дают None.
pub fn parse_price(raw: &str) -> Option<f64> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();

    if compact.is_empty() {
        return None;
    }

    let is_sep = |c: char| c == ',' || c == '.';
    let last_sep = compact
        .rfind(is_sep)
        .and_then(|pos| compact[pos..].chars().next());
    let decimal_sep = match last_sep {
        Some(sep) if compact.matches(sep).count() == 1 => Some(sep),
        // Повторяющийся последний разделитель вместе с другим — неоднозначно
        Some(sep) if compact.chars().any(|c| is_sep(c) && c != sep) => return None,
        _ => None,
    };

    let cleaned: String = compact
        .chars()
        .filter_map(|c| match c {
            ',' | '.' if Some(c) == decimal_sep => Some('.'),
            ',' | '.' => None,
            _ => Some(c),
        })
        .collect();

    match cleaned.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Some(price),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(article: &str, price: &str) -> RawRow {
        (Some(article.to_string()), Some(price.to_string()))
    }

    fn header() -> RawRow {
        row("Артикул", "Цена")
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("5309,00"), Some(5309.0));
        assert_eq!(parse_price("3563.00"), Some(3563.0));
        assert_eq!(parse_price(" 1 234,50 "), Some(1234.5));
        assert_eq!(parse_price("1\u{a0}000"), Some(1000.0));
        assert_eq!(parse_price("0"), Some(0.0));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("-5"), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn test_parse_price_mixed_separators() {
        assert_eq!(parse_price("1,234.50"), Some(1234.5));
        assert_eq!(parse_price("1.234,50"), Some(1234.5));
        assert_eq!(parse_price("1,234,567.5"), Some(1234567.5));
        assert_eq!(parse_price("1.234.567"), Some(1234567.0));
        assert_eq!(parse_price("1,234,567"), Some(1234567.0));
        assert_eq!(parse_price("50,5"), Some(50.5));
        assert_eq!(parse_price(","), None);
        assert_eq!(parse_price("1,2,3.4.5"), None);
    }

    #[test]
    fn test_load_valid_rows() {
        let outcome = PriceTable::load(vec![header(), row("ART1", "100"), row("ART2", "50,5")]);
        assert_eq!(outcome.loaded, 2);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.table.get("ART1"), Some(100.0));
        assert_eq!(outcome.table.get("ART2"), Some(50.5));
        assert_eq!(outcome.table.get("ART3"), None);
    }

    #[test]
    fn test_header_is_always_skipped() {
        // Заголовок с валидной "ценой" все равно не попадает в таблицу
        let outcome = PriceTable::load(vec![row("ART0", "10"), row("ART1", "100")]);
        assert_eq!(outcome.loaded, 1);
        assert_eq!(outcome.table.get("ART0"), None);
    }

    #[test]
    fn test_header_only_yields_empty_table() {
        let outcome = PriceTable::load(vec![header()]);
        assert_eq!(outcome.loaded, 0);
        assert!(outcome.table.is_empty());

        let outcome = PriceTable::load(Vec::<RawRow>::new());
        assert_eq!(outcome.loaded, 0);
    }

    #[test]
    fn test_bad_rows_are_skipped_individually() {
        let outcome = PriceTable::load(vec![
            header(),
            row("", "100"),
            (None, Some("100".into())),
            row("   ", "100"),
            row("ART1", "not a price"),
            (Some("ART2".into()), None),
            row("ART3", "  "),
            row("ART4", "42"),
        ]);
        assert_eq!(outcome.loaded, 1);
        assert_eq!(outcome.skipped, 6);
        assert_eq!(outcome.table.get("ART1"), None);
        assert_eq!(outcome.table.get("ART2"), None);
        assert_eq!(outcome.table.get("ART3"), None);
        assert_eq!(outcome.table.get("ART4"), Some(42.0));
    }

    #[test]
    fn test_duplicate_article_last_wins() {
        let outcome = PriceTable::load(vec![
            header(),
            row("ART1", "100"),
            row("ART2", "20"),
            row(" ART1 ", "120"),
        ]);
        assert_eq!(outcome.loaded, 2);
        assert_eq!(outcome.table.get("ART1"), Some(120.0));
        let articles: Vec<&str> = outcome
            .table
            .entries()
            .iter()
            .map(|e| e.article.as_str())
            .collect();
        assert_eq!(articles, vec!["ART1", "ART2"]);
    }

    #[test]
    fn test_lookup_trims_article() {
        let outcome = PriceTable::load(vec![header(), row("ART1", "100")]);
        assert_eq!(outcome.table.get(" ART1\t"), Some(100.0));
    }
}
