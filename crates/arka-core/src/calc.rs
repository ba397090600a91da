//! Transaction aggregation and currency formatting
//!
//! Pure helpers behind the reports and transaction-entry screens. All
//! functions borrow their input and never mutate it; callers can invoke
//! them concurrently without coordination.
//!
//! Whether a transaction counts as income is decided by the caller-supplied
//! set of income category names. The core holds no category state of its
//! own.

use serde::{Deserialize, Deserializer, Serialize};

/// Fixed Sunday-first weekday abbreviations used for the weekly chart.
///
/// This is an opaque ordered constant, deliberately not derived from a
/// locale API so output is identical across platforms.
pub const WEEKDAY_LABELS: [&str; 7] = ["Di", "Hë", "Ma", "Më", "En", "Pr", "Sh"];

/// Income/expense tag on a transaction. Optional on input; aggregation
/// classifies by category membership, not by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// A logged income/expense record as the UI hands it over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Missing, null, or non-numeric amounts are treated as 0 in sums.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    pub category: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    /// ISO-8601 date string.
    pub date: String,
}

/// Lenient amount coercion: accepts a JSON number, a numeric string, or
/// anything else (which becomes 0). Documented default rather than an
/// implicit cast.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse().unwrap_or(0.0),
        Raw::Other(_) => 0.0,
    })
}

/// Income/expense totals over a transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
}

/// One day of the weekly expense chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyBucket {
    pub label: &'static str,
    pub value: f64,
}

/// Partition transactions by income-category membership and sum both sides.
///
/// `net_balance` is exactly `total_income - total_expense`; an empty slice
/// yields all zeros.
pub fn calculate_totals(transactions: &[Transaction], income_categories: &[&str]) -> Totals {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for t in transactions {
        if income_categories.contains(&t.category.as_str()) {
            total_income += t.amount;
        } else {
            total_expense += t.amount;
        }
    }

    Totals {
        total_income,
        total_expense,
        net_balance: total_income - total_expense,
    }
}

/// Bucket expense transactions by day of week, Sunday first.
///
/// Always returns exactly 7 buckets in [`WEEKDAY_LABELS`] order; days with
/// no expenses have value 0. Values are rounded to 2 decimal places.
/// Transactions whose date does not parse are skipped.
pub fn weekly_expenses(
    transactions: &[Transaction],
    income_categories: &[&str],
) -> [WeeklyBucket; 7] {
    let mut sums = [0.0f64; 7];

    for t in transactions {
        if income_categories.contains(&t.category.as_str()) {
            continue;
        }
        if let Some(day) = day_index(&t.date) {
            sums[day] += t.amount;
        }
    }

    let mut buckets = [WeeklyBucket {
        label: WEEKDAY_LABELS[0],
        value: 0.0,
    }; 7];
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.label = WEEKDAY_LABELS[i];
        bucket.value = round2(sums[i]);
    }
    buckets
}

/// Day-of-week index (0 = Sunday) of an ISO-8601 date string, `None` if it
/// does not parse. Datetimes are taken at their stated instant, date-only
/// strings as a calendar date.
fn day_index(date: &str) -> Option<usize> {
    use chrono::Datelike;

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        return Some(dt.weekday().num_days_from_sunday() as usize);
    }
    // Minute-precision datetimes ("2023-10-01T10:00Z") are valid ISO-8601
    // but not RFC 3339; `%#z` also covers compact offsets like "+0200".
    for format in ["%Y-%m-%dT%H:%M%#z", "%Y-%m-%dT%H:%M:%S%#z"] {
        if let Ok(dt) = chrono::DateTime::parse_from_str(date, format) {
            return Some(dt.weekday().num_days_from_sunday() as usize);
        }
    }
    // Zoneless datetimes only carry a calendar date for our purposes.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date, format) {
            return Some(dt.weekday().num_days_from_sunday() as usize);
        }
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(d.weekday().num_days_from_sunday() as usize);
    }
    None
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format an amount with two decimal places and en-US thousands grouping,
/// without a currency symbol (the caller prepends one).
///
/// `NaN` formats as `"NaN"` and infinities as `"∞"`/`"-∞"`; these are
/// accepted coercion boundary behaviors, not errors.
pub fn format_currency(amount: f64) -> String {
    if amount.is_nan() {
        return "NaN".to_string();
    }
    if amount.is_infinite() {
        return if amount > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let rounded = format!("{:.2}", amount.abs());
    // "{:.2}" always produces a fractional part
    let (int_part, frac_part) = rounded
        .split_once('.')
        .unwrap_or((rounded.as_str(), "00"));

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if amount < 0.0 {
        grouped.push('-');
    }
    for (i, b) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*b as char);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    grouped
}

/// Coerce a raw form-input string to a number the way the UI expects:
/// blank input is 0, anything non-numeric is NaN (which [`format_currency`]
/// then renders as `"NaN"`).
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}
