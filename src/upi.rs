use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{
    config::UpiConfig,
    intent::{
        Currency, GatewayError, IntentStatus, PaymentIntentResult, Provider, ProviderClient,
        ValidatedRequest,
    },
    token::{NoExchange, ProviderToken},
};

/// UPI settles in rupees only
const UPI_CURRENCY: Currency = Currency::INR;

/// Characters left as-is inside a query component, same as `encodeURIComponent`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds `upi://pay` deep links locally, without any network call.
#[derive(Debug, Clone)]
pub struct UpiLinkClient {
    payee_id: String,
    payee_name: String,
    default_note: String,
}

impl UpiLinkClient {
    pub fn new(config: &UpiConfig) -> Self {
        Self {
            payee_id: config.payee_id.clone(),
            payee_name: config.payee_name.clone(),
            default_note: format!("Payment to {}", config.payee_name),
        }
    }

    pub fn link(&self, request: &ValidatedRequest) -> String {
        let note = request.note().unwrap_or(self.default_note.as_str());
        format!(
            "upi://pay?pa={}&pn={}&am={}&cu={}&tn={}",
            self.payee_id,
            utf8_percent_encode(&self.payee_name, QUERY_COMPONENT),
            request.amount(),
            UPI_CURRENCY.code(),
            utf8_percent_encode(note, QUERY_COMPONENT),
        )
    }
}

impl ProviderClient for UpiLinkClient {
    type Exchange = NoExchange;

    fn provider(&self) -> Provider {
        Provider::Upi
    }

    fn token_exchange(&self) -> Option<&NoExchange> {
        None
    }

    async fn create_order(
        &self,
        _token: Option<&ProviderToken>,
        request: &ValidatedRequest,
    ) -> Result<PaymentIntentResult, GatewayError> {
        Ok(PaymentIntentResult::new(
            Provider::Upi,
            self.link(request),
            IntentStatus::Created,
        ))
    }
}
