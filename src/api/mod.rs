use axum::response::IntoResponse;
use serde::Serialize;

use crate::{
    intent::{FieldViolation, IntentError, Stage, ValidationError},
    mask,
};

/// `POST /gpay/link`
pub mod gpay;
/// `POST /paypal/create-order`
pub mod paypal;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    stage: Stage,
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for IntentError {
    fn into_response(self) -> axum::response::Response {
        let status = self.error.status_code();
        if status.is_server_error() {
            tracing::error!(stage = %self.stage, %status, "Payment intent failed: {}", self.error);
        } else {
            tracing::warn!(stage = %self.stage, %status, "Payment intent rejected: {}", self.error);
        }
        let body = ErrorResponse {
            stage: self.stage,
            kind: self.error.kind(),
            message: self.error.to_string(),
            details: self.error.details(),
        };
        tracing::debug!(data = %mask::secure_serializable(&body), "Error response payload");
        (status, axum::Json(body)).into_response()
    }
}

/// `Json` extractor wrapper that reports body errors as validation failures
pub struct Json<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for Json<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = IntentError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let rejection = match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => return Ok(Self(value)),
            Err(e) => e.body_text(),
        };
        Err(IntentError::new(
            Stage::Validation,
            ValidationError {
                violations: vec![FieldViolation::new("body", rejection)],
            },
        ))
    }
}
