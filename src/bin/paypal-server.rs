use anyhow::Context;
use intent_gateway::{
    api,
    config::{PaypalConfig, ServerConfig},
    intent::IntentGateway,
    paypal::PaypalClient,
    server,
    state::AppState,
};

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::init();

    let config = PaypalConfig::load()
        .inspect_err(|e| tracing::error!("Invalid PayPal configuration: {e}"))?;
    let server_config = ServerConfig::load(DEFAULT_PORT)?;
    tracing::info!(base_url = %config.base_url, "Using PayPal API");

    let client = PaypalClient::new(&config).context("build http client")?;
    let state = AppState::new(IntentGateway::new(client));
    let app = api::paypal::router().with_state(state);

    server::serve("PayPal server", app, server_config.port).await?;
    Ok(())
}
