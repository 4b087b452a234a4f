use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::token::{ProviderToken, TokenCache, TokenExchange};

mod error;
/// Request validation and supported currencies
mod validate;

pub use error::{FieldViolation, GatewayError, IntentError, Stage, ValidationError};
pub use validate::{Currency, NOTE_MAX_CHARS, RequestValidator, ValidatedRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    Paypal,
    Upi,
}

/// Intent exactly as the caller sent it.
///
/// Fields stay loosely typed so validation can report every problem at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIntentRequest {
    /// Decimal string in major units or an integer in minor units
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntentStatus {
    Created,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntentResult {
    provider: Provider,
    /// Order id or payment link
    reference: String,
    status: IntentStatus,
}

impl PaymentIntentResult {
    pub fn new(provider: Provider, reference: String, status: IntentStatus) -> Self {
        Self {
            provider,
            reference,
            status,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn status(&self) -> IntentStatus {
        self.status
    }
}

/// Payment rail able to turn a validated intent into an order.
pub trait ProviderClient: Send + Sync {
    type Exchange: TokenExchange;

    fn provider(&self) -> Provider;

    /// `None` when orders can be created without an access token.
    fn token_exchange(&self) -> Option<&Self::Exchange>;

    /// Performs at most one outbound call.
    fn create_order(
        &self,
        token: Option<&ProviderToken>,
        request: &ValidatedRequest,
    ) -> impl Future<Output = Result<PaymentIntentResult, GatewayError>> + Send;
}

/// Validation, token acquisition and order creation for a single provider.
#[derive(Debug)]
pub struct IntentGateway<C> {
    validator: RequestValidator,
    tokens: TokenCache,
    client: C,
}

impl<C: ProviderClient> IntentGateway<C> {
    pub fn new(client: C) -> Self {
        Self::with_token_cache(client, TokenCache::default())
    }

    pub fn with_token_cache(client: C, tokens: TokenCache) -> Self {
        Self {
            validator: RequestValidator::for_provider(client.provider()),
            tokens,
            client,
        }
    }

    pub fn provider(&self) -> Provider {
        self.client.provider()
    }

    /// Runs every stage in order and stops at the first failing one.
    #[instrument(skip_all, fields(provider = ?self.client.provider()))]
    pub async fn create_intent(
        &self,
        request: &RawIntentRequest,
    ) -> Result<PaymentIntentResult, IntentError> {
        let validated = self
            .validator
            .validate(request)
            .map_err(|e| IntentError::new(Stage::Validation, e))?;

        let token = match self.client.token_exchange() {
            Some(exchange) => Some(
                self.tokens
                    .get_token(self.client.provider(), exchange)
                    .await
                    .map_err(|e| IntentError::new(Stage::Auth, e))?,
            ),
            None => None,
        };

        let result = self
            .client
            .create_order(token.as_ref(), &validated)
            .await
            .map_err(|e| IntentError::new(Stage::Provider, e))?;
        tracing::info!(
            reference = %result.reference,
            status = ?result.status,
            amount = %validated.amount(),
            currency = validated.currency().code(),
            "Created payment intent"
        );
        Ok(result)
    }
}
