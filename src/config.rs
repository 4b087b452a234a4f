use std::{fmt::Display, time::Duration};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const PAYPAL_SANDBOX_URL: &str = "https://api-m.sandbox.paypal.com";
const PAYPAL_LIVE_URL: &str = "https://api-m.paypal.com";

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { var: &'static str, reason: String },
}

impl std::error::Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "required variable {var} is not set"),
            ConfigError::Invalid { var, reason } => write!(f, "variable {var} is invalid: {reason}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaypalEnvironment {
    Sandbox,
    Live,
}

impl PaypalEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PaypalEnvironment::Sandbox => PAYPAL_SANDBOX_URL,
            PaypalEnvironment::Live => PAYPAL_LIVE_URL,
        }
    }
}

/// Credentials and endpoints of the PayPal REST API.
#[derive(Clone)]
pub struct PaypalConfig {
    pub client_id: String,
    pub secret: String,
    pub base_url: String,
    pub timeout: Duration,
}

// Secret stays out of logs
impl std::fmt::Debug for PaypalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaypalConfig")
            .field("client_id", &self.client_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl PaypalConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let client_id = required(&lookup, "PAYPAL_CLIENT_ID")?;
        let secret = required(&lookup, "PAYPAL_SECRET")?;
        let environment = match lookup("PAYPAL_ENV").as_deref().map(str::trim) {
            None | Some("") | Some("sandbox") => PaypalEnvironment::Sandbox,
            Some("live") => PaypalEnvironment::Live,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "PAYPAL_ENV",
                    reason: format!("expected `sandbox` or `live`, got `{other}`"),
                });
            }
        };
        let base_url = lookup("PAYPAL_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| environment.base_url().to_string());
        Ok(Self {
            client_id,
            secret,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: timeout(&lookup)?,
        })
    }
}

/// Payee shown in generated UPI links.
#[derive(Debug, Clone)]
pub struct UpiConfig {
    pub payee_id: String,
    pub payee_name: String,
}

impl UpiConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let payee_id = required(&lookup, "UPI_PAYEE_ID")?;
        let payee_name = required(&lookup, "UPI_PAYEE_NAME")?;
        if !is_vpa(&payee_id) {
            return Err(ConfigError::Invalid {
                var: "UPI_PAYEE_ID",
                reason: format!("`{payee_id}` is not a virtual payment address"),
            });
        }
        Ok(Self {
            payee_id,
            payee_name,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn load(default_port: u16) -> Result<Self> {
        Self::from_lookup(env_lookup, default_port)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, default_port: u16) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(port) => port.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: format!("`{port}` is not a port number"),
            })?,
            None => default_port,
        };
        Ok(Self { port })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn timeout(lookup: &impl Fn(&str) -> Option<String>) -> Result<Duration> {
    let Some(raw) = lookup("HTTP_TIMEOUT_SECS") else {
        return Ok(DEFAULT_TIMEOUT);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            var: "HTTP_TIMEOUT_SECS",
            reason: format!("`{raw}` is not a positive number of seconds"),
        }),
    }
}

/// `handle@provider` with the character set UPI apps accept.
fn is_vpa(value: &str) -> bool {
    let allowed = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    };
    match value.split_once('@') {
        Some((handle, provider)) => allowed(handle) && allowed(provider),
        None => false,
    }
}
