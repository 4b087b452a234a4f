use axum::{extract::State, routing::post};
use tracing::instrument;

use crate::{
    api::Json,
    intent::{IntentError, PaymentIntentResult, RawIntentRequest},
    paypal::PaypalClient,
    state::AppState,
};

#[instrument(skip_all)]
async fn create_order(
    State(AppState { gateway }): State<AppState<PaypalClient>>,
    Json(request): Json<RawIntentRequest>,
) -> Result<axum::Json<PaymentIntentResult>, IntentError> {
    tracing::debug!(amount = ?request.amount, currency = ?request.currency, "Create order request");
    let result = gateway.create_intent(&request).await?;
    Ok(axum::Json(result))
}

pub fn router() -> axum::Router<AppState<PaypalClient>> {
    axum::Router::new().route("/paypal/create-order", post(create_order))
}
