/// Форматирует число с разделителями тысяч (точками): 1234567 -> "1.234.567"
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Округляет цену до копеек
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Цена для логов: разделители тысяч и две цифры после запятой, 1234.5 -> "1.234,50"
pub fn format_price(value: f64) -> String {
    let kopecks = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && kopecks > 0 { "-" } else { "" };
    format!(
        "{}{},{:02}",
        sign,
        format_number((kopecks / 100) as usize),
        kopecks % 100
    )
}
