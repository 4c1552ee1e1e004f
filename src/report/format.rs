//! Locale formatting for quote documents (pt-BR)
//!
//! Amounts use a period for thousands and a comma for decimals: `R$ 1.234,56`.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

pub const CURRENCY_PREFIX: &str = "R$";

const MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho",
    "julho", "agosto", "setembro", "outubro", "novembro", "dezembro",
];

/// Group the integer digits in threes with `.`
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

/// `1234.5` -> `1.234,50`
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let negative = amount < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!(
        "{}{},{}",
        if negative { "-" } else { "" },
        group_thousands(int_part),
        frac_part
    )
}

/// `1234.5` -> `R$ 1.234,50`
pub fn format_currency(amount: f64) -> String {
    format_currency_with(CURRENCY_PREFIX, amount)
}

pub fn format_currency_with(prefix: &str, amount: f64) -> String {
    format!("{} {}", prefix, format_amount(amount))
}

/// Percent without trailing zeros: `20.0` -> `20`, `12.5` -> `12,5`
pub fn format_percent(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.replace('.', ",")
}

/// `2026-10-19` -> `19 de outubro de 2026`
pub fn format_long_date(date: NaiveDate) -> String {
    let month = MONTHS
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{:02} de {} de {}", date.day(), month, date.year())
}

/// `19 de outubro de 2026 às 14:30`
pub fn format_timestamp(at: NaiveDateTime) -> String {
    format!("{} às {:02}:{:02}", format_long_date(at.date()), at.hour(), at.minute())
}

/// Suggested download name: `cotacao_<YYYYMMDD_HHMMSS>.pdf`
pub fn report_filename(at: NaiveDateTime) -> String {
    at.format("cotacao_%Y%m%d_%H%M%S.pdf").to_string()
}

/// `Beneficiários: 2 pessoas`
pub fn beneficiary_count_label(count: usize) -> String {
    format!(
        "Beneficiários: {} pessoa{}",
        count,
        if count > 1 { "s" } else { "" }
    )
}
