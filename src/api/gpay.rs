use axum::{extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    api::Json,
    intent::{IntentError, RawIntentRequest},
    state::AppState,
    upi::UpiLinkClient,
};

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<LinkRequest> for RawIntentRequest {
    fn from(LinkRequest { amount, note }: LinkRequest) -> Self {
        Self {
            amount,
            currency: Some("INR".to_string()),
            note,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub link: String,
}

#[instrument(skip_all)]
async fn create_link(
    State(AppState { gateway }): State<AppState<UpiLinkClient>>,
    Json(request): Json<LinkRequest>,
) -> Result<axum::Json<LinkResponse>, IntentError> {
    let request = RawIntentRequest::from(request);
    let result = gateway.create_intent(&request).await?;
    Ok(axum::Json(LinkResponse {
        link: result.reference().to_string(),
    }))
}

pub fn router() -> axum::Router<AppState<UpiLinkClient>> {
    axum::Router::new().route("/gpay/link", post(create_link))
}
