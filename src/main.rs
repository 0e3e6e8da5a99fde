use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kyc_onboarding::config::Config;
use kyc_onboarding::handlers::AppState;
use kyc_onboarding::routes::build_app;

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, builds the shared KYC client and
/// session store, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kyc_onboarding=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let state = AppState::new(config.clone())?;
    tracing::info!("✓ KYC client initialized: {}", config.kyc_api_base_url);
    tracing::info!(
        "Session store initialized ({}s idle TTL, {} max)",
        config.session_ttl_secs,
        config.max_sessions
    );

    let app = build_app(Arc::new(state), true)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
