use tracing::instrument;

use crate::{
    config::PaypalConfig,
    intent::{
        GatewayError, IntentStatus, PaymentIntentResult, Provider, ProviderClient,
        ValidatedRequest,
    },
    mask,
    paypal::order::{OrderRequest, OrderResponse},
    token::ProviderToken,
};

mod auth;
/// Orders API payloads
mod order;

pub use auth::OAuthExchange;

/// Makes order creation idempotent on PayPal's side
const REQUEST_ID_HEADER: &str = "paypal-request-id";

/// Response body as JSON, or as a JSON string when it is not JSON.
fn response_payload(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[derive(Debug, Clone)]
pub struct PaypalClient {
    client: reqwest::Client,
    orders_url: String,
    auth: OAuthExchange,
}

impl PaypalClient {
    pub fn new(config: &PaypalConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let auth = OAuthExchange::new(
            client.clone(),
            &config.base_url,
            config.client_id.clone(),
            config.secret.clone(),
        );
        Ok(Self {
            client,
            orders_url: format!("{}/v2/checkout/orders", config.base_url),
            auth,
        })
    }
}

impl ProviderClient for PaypalClient {
    type Exchange = OAuthExchange;

    fn provider(&self) -> Provider {
        Provider::Paypal
    }

    fn token_exchange(&self) -> Option<&OAuthExchange> {
        Some(&self.auth)
    }

    #[instrument(skip_all)]
    async fn create_order(
        &self,
        token: Option<&ProviderToken>,
        request: &ValidatedRequest,
    ) -> Result<PaymentIntentResult, GatewayError> {
        let Some(token) = token else {
            return Err(GatewayError::Auth {
                message: "orders API requires an access token".into(),
                payload: None,
            });
        };
        let order = OrderRequest::from(request);
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(
            url = %self.orders_url,
            %request_id,
            data = %mask::secure_serializable(&order),
            "PayPal create order request"
        );
        let res = self
            .client
            .post(&self.orders_url)
            .headers(auth::bearer_headers(token)?)
            .header(REQUEST_ID_HEADER, request_id)
            .json(&order)
            .send()
            .await?;
        let status = res.status();
        let payload = response_payload(&res.bytes().await?);
        tracing::debug!(%status, response = %mask::secure_value(&payload), "PayPal create order response");

        if !status.is_success() {
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                payload,
            });
        }
        let order = serde_json::from_value::<OrderResponse>(payload)
            .map_err(|e| GatewayError::Protocol(format!("order response: {e}")))?;
        if order.id.trim().is_empty() {
            return Err(GatewayError::Protocol("order response has an empty id".into()));
        }
        let status = if order.is_voided() {
            IntentStatus::Failed
        } else {
            IntentStatus::Created
        };
        Ok(PaymentIntentResult::new(Provider::Paypal, order.id, status))
    }
}
