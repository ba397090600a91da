//! Receipt schema types and validation
//!
//! [`ReceiptData`] is the stable contract handed to the UI for confirmation
//! and then to the persistence collaborator; field names and types on the
//! wire must not drift (camelCase, ISO-8601 date string, plain numbers).
//!
//! [`validate_receipt`] turns an untrusted JSON payload into a typed record
//! or fails with a [`crate::Error::Validation`] that lists **every**
//! violated field path, not just the first. Validation failure is always a
//! hard failure; no partial record is ever produced.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Currencies a receipt may be denominated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "USD")]
    Usd,
    /// Albanian lek
    #[serde(rename = "ALL")]
    Lek,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Lek => "ALL",
        }
    }
}

const CURRENCY_CODES: [&str; 3] = ["EUR", "USD", "ALL"];

/// Spending category inferred from the receipt contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptCategory {
    Ushqim,
    Transport,
    #[serde(rename = "Argëtim")]
    Argetim,
    #[serde(rename = "Shërbime")]
    Sherbime,
    #[serde(rename = "Tjetër")]
    Tjeter,
}

impl ReceiptCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptCategory::Ushqim => "Ushqim",
            ReceiptCategory::Transport => "Transport",
            ReceiptCategory::Argetim => "Argëtim",
            ReceiptCategory::Sherbime => "Shërbime",
            ReceiptCategory::Tjeter => "Tjetër",
        }
    }
}

const CATEGORY_NAMES: [&str; 5] = ["Ushqim", "Transport", "Argëtim", "Shërbime", "Tjetër"];

/// A line item found on the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    pub total: f64,
}

fn default_quantity() -> f64 {
    1.0
}

/// Validated data extracted from a scanned receipt. Immutable once
/// validated; constructed only by [`validate_receipt`] (and tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    pub merchant_name: String,
    /// ISO-8601 datetime string of the transaction.
    pub date: String,
    pub total_amount: f64,
    #[serde(default)]
    pub currency: Currency,
    pub category: ReceiptCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ReceiptItem>>,
    /// AI confidence score for the extraction, in [0, 1].
    pub confidence: f64,
}

/// Validate a raw AI payload against the receipt schema.
///
/// Collects every violation as `path: constraint` before failing, so the
/// error message a user sees names all offending fields at once.
pub fn validate_receipt(raw: &Value) -> Result<ReceiptData> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            return Err(Error::Validation(format!(
                "expected a JSON object, got {}",
                json_type_name(raw)
            )))
        }
    };

    let mut issues = Vec::new();

    match obj.get("merchantName") {
        Some(Value::String(s)) if !s.is_empty() => {}
        Some(Value::String(_)) => issues.push("merchantName: Merchant name is missing".to_string()),
        Some(other) => issues.push(format!(
            "merchantName: expected a string, got {}",
            json_type_name(other)
        )),
        None => issues.push("merchantName: Merchant name is missing".to_string()),
    }

    match obj.get("date") {
        Some(Value::String(s)) if chrono::DateTime::parse_from_rfc3339(s).is_ok() => {}
        Some(Value::String(_)) => issues.push("date: invalid ISO-8601 datetime".to_string()),
        Some(other) => issues.push(format!(
            "date: expected a string, got {}",
            json_type_name(other)
        )),
        None => issues.push("date: required".to_string()),
    }

    match number_field(obj.get("totalAmount")) {
        NumberField::Present(n) if n > 0.0 => {}
        NumberField::Present(_) => {
            issues.push("totalAmount: Total amount must be positive".to_string())
        }
        NumberField::WrongType(got) => {
            issues.push(format!("totalAmount: expected a number, got {}", got))
        }
        NumberField::Missing => issues.push("totalAmount: required".to_string()),
    }

    // Optional with a default of EUR; invalid values are rejected, not defaulted
    match obj.get("currency") {
        None => {}
        Some(Value::String(s)) if CURRENCY_CODES.contains(&s.as_str()) => {}
        Some(_) => issues.push(format!(
            "currency: invalid value, expected one of {}",
            CURRENCY_CODES.join(", ")
        )),
    }

    match obj.get("category") {
        Some(Value::String(s)) if CATEGORY_NAMES.contains(&s.as_str()) => {}
        Some(_) => issues.push(format!(
            "category: invalid value, expected one of {}",
            CATEGORY_NAMES.join(", ")
        )),
        None => issues.push("category: required".to_string()),
    }

    match obj.get("items") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                validate_item(item, i, &mut issues);
            }
        }
        Some(other) => issues.push(format!(
            "items: expected an array, got {}",
            json_type_name(other)
        )),
    }

    match number_field(obj.get("confidence")) {
        NumberField::Present(n) if (0.0..=1.0).contains(&n) => {}
        NumberField::Present(_) => issues.push("confidence: must be between 0 and 1".to_string()),
        NumberField::WrongType(got) => {
            issues.push(format!("confidence: expected a number, got {}", got))
        }
        NumberField::Missing => issues.push("confidence: required".to_string()),
    }

    if !issues.is_empty() {
        return Err(Error::Validation(issues.join(", ")));
    }

    // The walk above guarantees this succeeds; any residual mismatch is
    // still surfaced as a validation failure rather than a panic.
    serde_json::from_value(raw.clone()).map_err(|e| Error::Validation(e.to_string()))
}

fn validate_item(item: &Value, index: usize, issues: &mut Vec<String>) {
    let obj = match item.as_object() {
        Some(obj) => obj,
        None => {
            issues.push(format!(
                "items.{}: expected an object, got {}",
                index,
                json_type_name(item)
            ));
            return;
        }
    };

    match obj.get("description") {
        Some(Value::String(s)) if !s.is_empty() => {}
        _ => issues.push(format!("items.{}.description: Item description is required", index)),
    }

    match number_field(obj.get("quantity")) {
        NumberField::Present(n) if n >= 0.0 => {}
        NumberField::Present(_) => {
            issues.push(format!("items.{}.quantity: must be >= 0", index))
        }
        NumberField::WrongType(got) => {
            issues.push(format!("items.{}.quantity: expected a number, got {}", index, got))
        }
        // Optional, defaults to 1
        NumberField::Missing => {}
    }

    match number_field(obj.get("unitPrice")) {
        NumberField::Present(n) if n >= 0.0 => {}
        NumberField::Present(_) => {
            issues.push(format!("items.{}.unitPrice: must be >= 0", index))
        }
        NumberField::WrongType(got) => {
            issues.push(format!("items.{}.unitPrice: expected a number, got {}", index, got))
        }
        // Optional
        NumberField::Missing => {}
    }

    match number_field(obj.get("total")) {
        NumberField::Present(n) if n >= 0.0 => {}
        NumberField::Present(_) => issues.push(format!("items.{}.total: must be >= 0", index)),
        NumberField::WrongType(got) => {
            issues.push(format!("items.{}.total: expected a number, got {}", index, got))
        }
        NumberField::Missing => issues.push(format!("items.{}.total: required", index)),
    }
}

enum NumberField {
    Present(f64),
    WrongType(&'static str),
    Missing,
}

fn number_field(value: Option<&Value>) -> NumberField {
    match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => NumberField::Present(f),
            None => NumberField::WrongType("number"),
        },
        Some(Value::Null) | None => NumberField::Missing,
        Some(other) => NumberField::WrongType(json_type_name(other)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
