//! Receipt scanning pipeline
//!
//! Linear pipeline with no retries: credential check, vision request,
//! content extraction, JSON extraction, schema validation. Every failure
//! is one classified [`Error`](crate::Error) variant and no partial record
//! is ever returned; a rejected scan is always a hard failure the UI
//! surfaces to the user.

use base64::Engine;
use tracing::debug;

use crate::error::{Error, Result};
use crate::receipt::{validate_receipt, ReceiptData};

use super::client::{ChatCompletionRequest, GroqClient, VISION_MODEL};
use super::parsing::extract_json;

const SCAN_PROMPT: &str = r#"Analyze this receipt image and extract the following data in strict JSON format matching this structure:
{
  "merchantName": "string",
  "date": "ISO 8601 date string (YYYY-MM-DDTHH:mm:ss.sssZ)",
  "totalAmount": number,
  "currency": "EUR" | "USD" | "ALL",
  "category": "Ushqim" | "Transport" | "Argëtim" | "Shërbime" | "Tjetër",
  "items": [{"description": "string", "quantity": number, "unitPrice": number, "total": number}],
  "confidence": number (0-1)
}
Ensure the JSON is valid. Do not include markdown formatting like ```json."#;

impl GroqClient {
    /// Scan a receipt image (JPEG bytes) into a validated [`ReceiptData`].
    pub async fn scan_receipt(&self, image_data: &[u8]) -> Result<ReceiptData> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image_data);
        self.scan_receipt_base64(&encoded).await
    }

    /// Same pipeline for callers that already hold a base64-encoded image
    /// (the camera layer hands images over pre-encoded).
    pub async fn scan_receipt_base64(&self, image_base64: &str) -> Result<ReceiptData> {
        let request = ChatCompletionRequest::vision(VISION_MODEL, SCAN_PROMPT, image_base64);
        let content = self.chat_completion(&request).await?;
        debug!(bytes = content.len(), "receipt scan response received");

        let payload = extract_json(&content).ok_or_else(|| {
            Error::Parsing("Failed to parse AI response as JSON.".to_string())
        })?;

        validate_receipt(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChatServer;
    use serde_json::json;

    fn valid_content() -> String {
        json!({
            "merchantName": "Spar",
            "date": "2023-10-27T10:00:00.000Z",
            "totalAmount": 15.50,
            "currency": "EUR",
            "category": "Ushqim",
            "items": [
                { "description": "Milk", "quantity": 1, "unitPrice": 1.50, "total": 1.50 }
            ],
            "confidence": 0.95
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_scan_happy_path() {
        let server = MockChatServer::with_content(&valid_content()).await;
        let client = GroqClient::new(Some("key".into())).with_base_url(&server.url());

        let receipt = client.scan_receipt(b"fake image bytes").await.unwrap();
        assert_eq!(receipt.merchant_name, "Spar");
        assert_eq!(receipt.total_amount, 15.50);
        assert_eq!(receipt.category.as_str(), "Ushqim");
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_scan_base64_entry_point() {
        let server = MockChatServer::with_content(&valid_content()).await;
        let client = GroqClient::new(Some("key".into())).with_base_url(&server.url());

        let receipt = client.scan_receipt_base64("ZmFrZQ==").await.unwrap();
        assert_eq!(receipt.merchant_name, "Spar");
    }

    #[tokio::test]
    async fn test_scan_non_json_content_is_parsing_error() {
        let server = MockChatServer::with_content("Sorry, I cannot read this image.").await;
        let client = GroqClient::new(Some("key".into())).with_base_url(&server.url());

        let err = client.scan_receipt(b"fake image bytes").await.unwrap_err();
        assert!(matches!(err, Error::Parsing(_)));
        assert!(err.to_string().contains("Failed to parse AI response as JSON"));
    }

    #[tokio::test]
    async fn test_scan_markdown_wrapped_content_succeeds() {
        let content = format!("Here is the data: ```json\n{}\n```", valid_content());
        let server = MockChatServer::with_content(&content).await;
        let client = GroqClient::new(Some("key".into())).with_base_url(&server.url());

        let receipt = client.scan_receipt(b"fake image bytes").await.unwrap();
        assert_eq!(receipt.merchant_name, "Spar");
    }

    #[tokio::test]
    async fn test_scan_negative_total_is_validation_error() {
        let content = json!({
            "merchantName": "Bad Store",
            "date": "2023-10-27T10:00:00.000Z",
            "totalAmount": -50,
            "currency": "EUR",
            "category": "Ushqim",
            "confidence": 0.9
        })
        .to_string();
        let server = MockChatServer::with_content(&content).await;
        let client = GroqClient::new(Some("key".into())).with_base_url(&server.url());

        let err = client.scan_receipt(b"fake image bytes").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("Total amount must be positive"));
    }

    #[tokio::test]
    async fn test_scan_http_500_is_api_error() {
        let server = MockChatServer::with_response(500, "overloaded").await;
        let client = GroqClient::new(Some("key".into())).with_base_url(&server.url());

        let err = client.scan_receipt(b"fake image bytes").await.unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::Api { status: 500, .. }));
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_scan_missing_credential_makes_no_network_call() {
        let server = MockChatServer::with_content(&valid_content()).await;
        let client = GroqClient::new(None).with_base_url(&server.url());

        let err = client.scan_receipt(b"fake image bytes").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(server.hits(), 0);
    }
}
