//! Money and date rendering for terminal output.

use chrono::{DateTime, NaiveDate, Utc};

/// Group digits the Indian way: last three, then pairs (12,34,567).
pub fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i == 3 || (i > 3 && i % 2 == 1) {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Amount with currency symbol, grouped digits and paise only when non-zero.
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    let paise = (value.abs() * 100.0).round() as i64;
    let whole = format_grouped_int(paise / 100);
    let sign = if value < 0.0 && paise > 0 { "-" } else { "" };
    if paise % 100 == 0 {
        format!("{sign}{currency_symbol}{whole}")
    } else {
        format!("{sign}{currency_symbol}{whole}.{:02}", paise % 100)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%d %b %Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_grouped_int(0), "0");
        assert_eq!(format_grouped_int(999), "999");
        assert_eq!(format_grouped_int(1000), "1,000");
        assert_eq!(format_grouped_int(100000), "1,00,000");
        assert_eq!(format_grouped_int(12345678), "1,23,45,678");
        assert_eq!(format_grouped_int(-250000), "-2,50,000");
    }

    #[test]
    fn test_money() {
        assert_eq!(format_money(3000.0, "₹"), "₹3,000");
        assert_eq!(format_money(1234.5, "₹"), "₹1,234.50");
        assert_eq!(format_money(-600.0, "₹"), "-₹600");
        assert_eq!(format_money(0.0, "Rs "), "Rs 0");
    }

    #[test]
    fn test_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(format_date(date), "10 Jan 2026");
    }
}
