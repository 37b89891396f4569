//! Pure conversions from raw statement text to structured values.
//!
//! Bank pages format numbers and dates by locale and rarely say which one.
//! Everything here is deterministic and never fails loudly: input that
//! cannot be read yields `None`.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

/// Parse a monetary amount whatever its decimal separator.
///
/// The separator is decided by position: the right-most `.` or `,` splits
/// integer from fraction, every other separator is a thousands mark. A `-`
/// anywhere in the input makes the result negative.
pub fn normalize_amount(raw: &str) -> Option<Decimal> {
    let negative = raw.contains('-') || raw.contains('\u{2212}');
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let reversed: String = cleaned.chars().rev().collect();
    let (fraction, integer) = match reversed.find(['.', ',']) {
        Some(split) => (
            reversed[..split].chars().rev().collect::<String>(),
            reversed[split + 1..]
                .chars()
                .rev()
                .filter(char::is_ascii_digit)
                .collect::<String>(),
        ),
        None => (String::new(), cleaned.clone()),
    };

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let integer = if integer.is_empty() {
        "0"
    } else {
        integer.as_str()
    };
    let literal = if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{}.{}", integer, fraction)
    };

    let value = Decimal::from_str(&literal).ok()?;
    Some(if negative { -value } else { value })
}

fn date_patterns() -> &'static [(Regex, DateOrder)] {
    static PATTERNS: OnceLock<Vec<(Regex, DateOrder)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"^(\d{4})-(\d{1,2})-(\d{1,2})", DateOrder::Ymd),
            (r"^(\d{1,2})\.\s*(\d{1,2})\.\s*(\d{4}|\d{2})\b", DateOrder::Dmy),
            (r"^(\d{1,2})-(\d{1,2})-(\d{4}|\d{2})\b", DateOrder::Dmy),
            (r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b", DateOrder::Mdy),
            (r"^(\d{1,2})\.?\s+(\p{L}+)\.?,?\s+(\d{4})\b", DateOrder::DayMonthName),
            (r"^(\p{L}+)\.?\s+(\d{1,2}),?\s+(\d{4})\b", DateOrder::MonthNameDay),
        ]
        .into_iter()
        .filter_map(|(pattern, order)| Regex::new(pattern).ok().map(|re| (re, order)))
        .collect()
    })
}

#[derive(Debug, Clone, Copy)]
enum DateOrder {
    Ymd,
    Dmy,
    Mdy,
    DayMonthName,
    MonthNameDay,
}

/// Read a localized date. Slashes mean US order (`MM/DD/YYYY`), dots and
/// dashes mean day first. Month names may be English or German.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    for (pattern, order) in date_patterns() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let (a, b, c) = (&caps[1], &caps[2], &caps[3]);
        let (year, month, day) = match order {
            DateOrder::Ymd => (a.parse().ok()?, b.parse().ok()?, c.parse().ok()?),
            DateOrder::Dmy => (expand_year(c)?, b.parse().ok()?, a.parse().ok()?),
            DateOrder::Mdy => (expand_year(c)?, a.parse().ok()?, b.parse().ok()?),
            DateOrder::DayMonthName => (c.parse().ok()?, month_number(b)?, a.parse().ok()?),
            DateOrder::MonthNameDay => (c.parse().ok()?, month_number(a)?, b.parse().ok()?),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    None
}

/// Two-digit years: 00-69 are 20xx, 70-99 are 19xx.
fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(match (raw.len(), year) {
        (2, 0..=69) => 2000 + year,
        (2, _) => 1900 + year,
        _ => year,
    })
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let month = match name.as_str() {
        "jan" | "january" | "januar" | "jän" | "jänner" => 1,
        "feb" | "february" | "februar" => 2,
        "mar" | "march" | "mär" | "märz" | "mrz" => 3,
        "apr" | "april" => 4,
        "may" | "mai" => 5,
        "jun" | "june" | "juni" => 6,
        "jul" | "july" | "juli" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" | "okt" | "oktober" => 10,
        "nov" | "november" => 11,
        "dec" | "december" | "dez" | "dezember" => 12,
        _ => return None,
    };
    Some(month)
}

/// Uppercase and drop everything that is not an ASCII letter or digit.
pub fn normalize_account(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Two letters followed by 13 to 32 digits, on an already normalized account.
pub fn is_iban(account: &str) -> bool {
    static IBAN: OnceLock<Option<Regex>> = OnceLock::new();
    IBAN.get_or_init(|| Regex::new(r"^[A-Z]{2}\d{13,32}$").ok())
        .as_ref()
        .map(|re| re.is_match(account))
        .unwrap_or(false)
}
