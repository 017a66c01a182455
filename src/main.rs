//! Snack bar storefront - menu, cart and Messenger checkout service

use anyhow::{Context, Result};
use snackbar_storefront::{api, catalog::Catalog, config::Config, handoff::MessengerHandoff};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let catalog = Catalog::load(&config.catalog_path).await
        .with_context(|| format!("loading catalog from {}", config.catalog_path.display()))?;
    let state = api::AppState::new(catalog, MessengerHandoff::new(config.messenger_endpoint.clone()));
    let app = api::router(state);

    tracing::info!("🍟 Snack bar storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
