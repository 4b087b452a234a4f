use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use axum_extra::headers::{self, HeaderMapExt};
use base64::{Engine, prelude::BASE64_STANDARD};
use time::{Duration, OffsetDateTime};
use tracing::instrument;

use crate::{
    intent::GatewayError,
    mask,
    paypal::response_payload,
    token::{ProviderToken, TokenExchange},
};

/// Lifetime assumed when the token response carries no `expires_in`
const DEFAULT_TOKEN_TTL: Duration = Duration::seconds(300);
/// Upper bound on the lifetime the provider may announce
const MAX_TOKEN_TTL: Duration = Duration::days(1);

pub fn basic_auth_headers(client_id: &str, secret: &str) -> HeaderMap {
    let auth = BASE64_STANDARD.encode(format!("{client_id}:{secret}"));
    let mut map = HeaderMap::new();
    map.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Basic {auth}")).expect("header value is ascii"),
    );
    map.typed_insert(headers::ContentType::form_url_encoded());
    map
}

pub fn bearer_headers(token: &ProviderToken) -> Result<HeaderMap, GatewayError> {
    let auth = headers::Authorization::bearer(token.access_token()).map_err(|_| {
        GatewayError::Protocol("access token is not a valid header value".into())
    })?;
    let mut map = HeaderMap::new();
    map.typed_insert(auth);
    map.typed_insert(headers::ContentType::json());
    Ok(map)
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OAuth2 client-credentials grant against `/v1/oauth2/token`.
#[derive(Clone)]
pub struct OAuthExchange {
    client: reqwest::Client,
    url: String,
    client_id: String,
    secret: String,
}

impl std::fmt::Debug for OAuthExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthExchange")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl OAuthExchange {
    pub fn new(client: reqwest::Client, base_url: &str, client_id: String, secret: String) -> Self {
        Self {
            client,
            url: format!("{base_url}/v1/oauth2/token"),
            client_id,
            secret,
        }
    }
}

impl TokenExchange for OAuthExchange {
    #[instrument(skip_all)]
    async fn exchange(&self, now: OffsetDateTime) -> Result<ProviderToken, GatewayError> {
        tracing::debug!(url = %self.url, "PayPal token request");
        let res = self
            .client
            .post(&self.url)
            .headers(basic_auth_headers(&self.client_id, &self.secret))
            .body("grant_type=client_credentials")
            .send()
            .await?;
        let status = res.status();
        let payload = response_payload(&res.bytes().await?);
        tracing::debug!(%status, response = %mask::secure_value(&payload), "PayPal token response");

        if !status.is_success() {
            return Err(GatewayError::Auth {
                message: format!("token endpoint answered {status}"),
                payload: Some(payload),
            });
        }
        let token = serde_json::from_value::<TokenResponse>(payload)
            .ok()
            .filter(|t| !t.access_token.is_empty())
            .ok_or_else(|| GatewayError::Auth {
                message: "token response has no access_token".into(),
                payload: None,
            })?;
        let ttl = token
            .expires_in
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TOKEN_TTL, Duration::seconds)
            .min(MAX_TOKEN_TTL);
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| GatewayError::Protocol("token expiry is out of range".into()))?;
        Ok(ProviderToken::new(token.access_token, expires_at))
    }
}
