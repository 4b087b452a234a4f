use std::fmt::Display;

use reqwest::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every violated field of a rejected request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.violations.iter().map(|v| v.field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for violation in &self.violations {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{} {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum GatewayError {
    Validation(ValidationError),
    /// Token exchange was rejected or returned no token
    Auth {
        message: String,
        payload: Option<serde_json::Value>,
    },
    /// Order creation was rejected upstream
    Provider {
        status: u16,
        payload: serde_json::Value,
    },
    /// Upstream answered with an unexpected shape
    Protocol(String),
    Network(reqwest::Error),
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::Auth { .. } => "auth",
            GatewayError::Provider { .. } => "provider",
            GatewayError::Protocol(_) => "protocol",
            GatewayError::Network(_) => "network",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Auth { .. } | GatewayError::Provider { .. } | GatewayError::Protocol(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Network(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            GatewayError::Validation(e) => serde_json::to_value(&e.violations).ok(),
            GatewayError::Auth { payload, .. } => payload.clone(),
            GatewayError::Provider { payload, .. } => Some(payload.clone()),
            GatewayError::Protocol(_) | GatewayError::Network(_) => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Self::Protocol(format!("failed to decode response body: {value}"));
        }
        Self::Network(value)
    }
}

impl From<ValidationError> for GatewayError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl std::error::Error for GatewayError {}

impl Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Validation(e) => write!(f, "invalid request: {e}"),
            GatewayError::Auth { message, .. } => write!(f, "authentication failed: {message}"),
            GatewayError::Provider { status, .. } => {
                write!(f, "provider rejected the request with status {status}")
            }
            GatewayError::Protocol(message) => write!(f, "unexpected provider response: {message}"),
            GatewayError::Network(e) if e.is_timeout() => write!(f, "provider request timed out"),
            GatewayError::Network(e) => write!(f, "provider request failed: {e}"),
        }
    }
}

/// Stage of the intent pipeline that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validation,
    Auth,
    Provider,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Validation => f.write_str("validation"),
            Stage::Auth => f.write_str("auth"),
            Stage::Provider => f.write_str("provider"),
        }
    }
}

#[derive(Debug)]
pub struct IntentError {
    pub stage: Stage,
    pub error: GatewayError,
}

impl IntentError {
    pub fn new(stage: Stage, error: impl Into<GatewayError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }

    /// Caller supplied something wrong, as opposed to an upstream failure.
    pub fn is_client_error(&self) -> bool {
        self.error.status_code().is_client_error()
    }
}

impl std::error::Error for IntentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl Display for IntentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} stage: {}", self.stage, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let validation = GatewayError::Validation(ValidationError {
            violations: vec![FieldViolation::new("amount", "is required")],
        });
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
        let auth = GatewayError::Auth {
            message: "rejected".into(),
            payload: None,
        };
        assert_eq!(auth.status_code(), StatusCode::BAD_GATEWAY);
        let provider = GatewayError::Provider {
            status: 422,
            payload: serde_json::json!({"name": "UNPROCESSABLE_ENTITY"}),
        };
        assert_eq!(provider.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            GatewayError::Protocol("no id".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn validation_message_lists_every_field() {
        let err = ValidationError {
            violations: vec![
                FieldViolation::new("amount", "must be greater than zero"),
                FieldViolation::new("currency", "is required"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "amount must be greater than zero; currency is required"
        );
        assert_eq!(err.fields().collect::<Vec<_>>(), ["amount", "currency"]);
    }

    #[test]
    fn intent_error_carries_stage() {
        let err = IntentError::new(
            Stage::Validation,
            ValidationError {
                violations: vec![FieldViolation::new("note", "is too long")],
            },
        );
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "validation stage: invalid request: note is too long");
    }
}
