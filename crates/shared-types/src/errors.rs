//! Common error types used across all widget crates
//! Provides consistent error handling and reporting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base error type for all widget operations
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum WidgetError {
    // Data-related errors
    #[error("Network request failed: {message}")]
    Network { message: String },

    #[error("Unexpected data shape: {message}")]
    DataShape { message: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        field: Option<String>,
    },

    // Rendering errors
    #[error("Render failed: {message}")]
    Render { message: String },

    // WASM-specific errors
    #[error("JavaScript interop error: {message}")]
    JsInterop { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl WidgetError {
    pub fn network(message: impl Into<String>) -> Self {
        WidgetError::Network {
            message: message.into(),
        }
    }

    pub fn data_shape(message: impl Into<String>) -> Self {
        WidgetError::DataShape {
            message: message.into(),
        }
    }

    pub fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        WidgetError::InvalidConfig {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }
}

/// Result type alias for widget operations
pub type WidgetResult<T> = Result<T, WidgetError>;

/// Error response structure for JavaScript interop
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: WidgetError,
    pub timestamp: u64,
    pub context: Option<ErrorContext>,
}

/// Additional context for error reporting
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorContext {
    pub component: String,
    pub operation: String,
}

impl ErrorResponse {
    pub fn new(error: WidgetError) -> Self {
        Self {
            success: false,
            error,
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
            context: None,
        }
    }

    pub fn with_context(mut self, component: &str, operation: &str) -> Self {
        self.context = Some(ErrorContext {
            component: component.to_string(),
            operation: operation.to_string(),
        });
        self
    }

    /// Convert to JSON string for JavaScript
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"type":"Internal","details":{"message":"Failed to serialize error"}}}"#.to_string()
        })
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        WidgetError::DataShape {
            message: format!("{err} (line {})", err.line()),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for WidgetError {
    fn from(err: wasm_bindgen::JsValue) -> Self {
        WidgetError::JsInterop {
            message: err.as_string().unwrap_or_else(|| format!("{err:?}")),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<WidgetError> for wasm_bindgen::JsValue {
    fn from(err: WidgetError) -> Self {
        wasm_bindgen::JsValue::from_str(&ErrorResponse::new(err).to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = WidgetError::network("HTTP 503 (URL: https://api.example.com)");

        let response = ErrorResponse::new(error).with_context("StationCache", "get_or_fetch");

        let json = response.to_json();
        assert!(json.contains("\"type\":\"Network\""));
        assert!(json.contains("HTTP 503"));
        assert!(json.contains("get_or_fetch"));
    }

    #[test]
    fn test_error_conversion() {
        let parse_err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err: WidgetError = parse_err.into();

        match err {
            WidgetError::DataShape { message } => assert!(message.contains("line 1")),
            _ => panic!("Wrong error variant"),
        }
    }

    #[test]
    fn test_display() {
        let err = WidgetError::invalid_config("scale", "unknown scale 'zoomed'");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: unknown scale 'zoomed'"
        );
    }
}
