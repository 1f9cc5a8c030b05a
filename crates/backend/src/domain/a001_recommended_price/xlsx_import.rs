use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use thiserror::Error;

use super::service::RawRow;

/// Ошибки чтения загруженного файла целиком (отдельные строки ошибок не дают)
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Недопустимый формат файла: {0}")]
    UnsupportedFormat(String),

    #[error("Ошибка чтения файла: {0}")]
    Parse(String),

    #[error("В файле нет листов")]
    NoSheet,

    #[error("В таблице должно быть минимум две колонки: артикул и цена")]
    MissingColumns,
}

const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Проверить расширение загруженного файла
pub fn check_extension(file_name: &str) -> Result<(), ImportError> {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(ImportError::UnsupportedFormat(file_name.to_string()))
    }
}

/// Прочитать первые две колонки первого листа книги.
///
/// Возвращает все строки, включая заголовок.
pub fn read_rows(file_name: &str, bytes: Vec<u8>) -> Result<Vec<RawRow>, ImportError> {
    check_extension(file_name)?;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ImportError::Parse(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoSheet)?
        .map_err(|e| ImportError::Parse(e.to_string()))?;

    if range.is_empty() {
        return Ok(Vec::new());
    }
    if range.width() < 2 {
        return Err(ImportError::MissingColumns);
    }

    let rows = range
        .rows()
        .map(|cells| {
            (
                cells.first().and_then(cell_to_string),
                cells.get(1).and_then(cell_to_string),
            )
        })
        .collect::<Vec<_>>();

    tracing::debug!("Read {} rows from '{}'", rows.len(), file_name);
    Ok(rows)
}

/// Текстовое представление ячейки. Целые числа без ".0", чтобы числовые
/// артикулы (12345) сопоставлялись с артикулами маркетплейсов.
fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Error(e) => {
            tracing::debug!("Cell error value: {:?}", e);
            None
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_recommended_price::PriceTable;
    use rust_xlsxwriter::Workbook;

    fn build_xlsx(fill: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        fill(sheet);
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_extension_check() {
        assert!(check_extension("prices.xlsx").is_ok());
        assert!(check_extension("PRICES.XLS").is_ok());
        assert!(matches!(
            check_extension("prices.csv"),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(check_extension("prices").is_err());
    }

    #[test]
    fn test_not_a_workbook_is_parse_error() {
        let result = read_rows("prices.xlsx", b"definitely not a zip".to_vec());
        assert!(matches!(result, Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_reads_rows_and_builds_table() {
        let bytes = build_xlsx(|sheet| {
            sheet.write_string(0, 0, "Артикул").unwrap();
            sheet.write_string(0, 1, "Цена").unwrap();
            sheet.write_string(1, 0, "ART1").unwrap();
            sheet.write_number(1, 1, 100.0).unwrap();
            sheet.write_number(2, 0, 12345.0).unwrap();
            sheet.write_string(2, 1, "1 250,50").unwrap();
            sheet.write_string(3, 0, "ART3").unwrap();
            sheet.write_string(3, 1, "нет цены").unwrap();
        });

        let rows = read_rows("prices.xlsx", bytes).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].0.as_deref(), Some("12345"));

        let outcome = PriceTable::load(rows);
        assert_eq!(outcome.loaded, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.table.get("ART1"), Some(100.0));
        assert_eq!(outcome.table.get("12345"), Some(1250.5));
    }

    #[test]
    fn test_single_column_sheet_is_rejected() {
        let bytes = build_xlsx(|sheet| {
            sheet.write_string(0, 0, "Артикул").unwrap();
            sheet.write_string(1, 0, "ART1").unwrap();
        });
        assert!(matches!(
            read_rows("prices.xlsx", bytes),
            Err(ImportError::MissingColumns)
        ));
    }

    #[test]
    fn test_header_only_sheet() {
        let bytes = build_xlsx(|sheet| {
            sheet.write_string(0, 0, "Артикул").unwrap();
            sheet.write_string(0, 1, "Цена").unwrap();
        });
        let rows = read_rows("prices.xlsx", bytes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(PriceTable::load(rows).loaded, 0);
    }
}
