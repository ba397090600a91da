//! Arka Core Library
//!
//! Backend-independent core of the Arka personal finance app:
//! - Arithmetic expression evaluation for the amount input field
//! - Transaction aggregation (totals, weekly buckets) and currency
//!   formatting for the reports screens
//! - Receipt schema validation with a classified error taxonomy
//! - Groq-backed AI operations: receipt scanning, chat-to-transaction
//!   intent parsing, memoized financial advice
//!
//! Screens, navigation, persistence, and auth live outside this crate and
//! are treated as external collaborators: they hand in raw strings and
//! transaction lists, and get back computed values, validated records, or
//! classified errors.

pub mod ai;
pub mod calc;
pub mod error;
pub mod expr;
pub mod receipt;

/// Test utilities including the mock chat-completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    snapshot_key, AdviceCache, FinanceSnapshot, GroqClient, TransactionIntent, CHAT_MODEL,
    GROQ_API_BASE, VISION_MODEL,
};
pub use calc::{
    calculate_totals, format_currency, parse_amount, weekly_expenses, Totals, Transaction,
    TransactionKind, WeeklyBucket, WEEKDAY_LABELS,
};
pub use error::{Error, Result};
pub use expr::evaluate_expression;
pub use receipt::{validate_receipt, Currency, ReceiptCategory, ReceiptData, ReceiptItem};
