use clap::Parser;
use kes_checkout::application::checkout::CheckoutService;
use kes_checkout::config::Cli;
use kes_checkout::domain::ports::ChargeGatewayBox;
use kes_checkout::infrastructure::cipher::CardCipher;
use kes_checkout::infrastructure::flutterwave::FlutterwaveClient;
use kes_checkout::interfaces::http::{AppState, Mode, create_router};
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kes_checkout=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Cli::parse().into_config().into_diagnostic()?;
    let gateway = &config.gateway;
    let mode = Mode::for_key(&gateway.secret_key);

    tracing::info!(
        gateway = %gateway.base_url,
        secret_key = %gateway.secret_key.preview(),
        mode = mode.as_str(),
        timeout_secs = gateway.timeout.as_secs(),
        "gateway configured"
    );

    let client: ChargeGatewayBox = Box::new(FlutterwaveClient::new(gateway).into_diagnostic()?);
    let checkout = CheckoutService::new(client, CardCipher::new(gateway.encryption_key.clone()));
    let state = Arc::new(AppState::new(
        checkout,
        mode,
        config.environment.exposes_error_details(),
    ));
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await.into_diagnostic()?;
    tracing::info!("Checkout server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
