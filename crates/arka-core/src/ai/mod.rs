//! Groq-backed AI operations
//!
//! This module turns untrusted, free-form LLM output into validated domain
//! values. Three operations share one HTTP client:
//!
//! - [`GroqClient::scan_receipt`]: vision request over a receipt image,
//!   strict schema validation, hard classified failure.
//! - [`GroqClient::parse_intent`]: natural-language sentence to a tagged
//!   [`TransactionIntent`]; unintelligible input is a soft `None`, not an
//!   error.
//! - [`GroqClient::financial_advice`]: memoized free-text advice that
//!   degrades to a canned tip instead of failing.
//!
//! Each call is a single awaited request. There is no retry, pooling, or
//! cancellation at this layer; callers race their own timeouts if needed.
//!
//! # Configuration
//!
//! Environment variables:
//! - `GROQ_API_KEY`: bearer credential (its absence is a checked
//!   [`crate::Error::Configuration`], raised before any network I/O)

mod advice;
mod client;
mod intent;
pub mod parsing;
mod scanner;

pub use advice::{snapshot_key, AdviceCache, FinanceSnapshot};
pub use client::{GroqClient, CHAT_MODEL, GROQ_API_BASE, VISION_MODEL};
pub use intent::TransactionIntent;
