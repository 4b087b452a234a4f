use intent_gateway::{
    api,
    config::{ServerConfig, UpiConfig},
    intent::IntentGateway,
    server,
    state::AppState,
    upi::UpiLinkClient,
};

const DEFAULT_PORT: u16 = 4000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::init();

    let config =
        UpiConfig::load().inspect_err(|e| tracing::error!("Invalid UPI configuration: {e}"))?;
    let server_config = ServerConfig::load(DEFAULT_PORT)?;
    tracing::info!(payee = %config.payee_id, "Using UPI payee");

    let state = AppState::new(IntentGateway::new(UpiLinkClient::new(&config)));
    let app = api::gpay::router().with_state(state);

    server::serve("GPay/UPI server", app, server_config.port).await?;
    Ok(())
}
