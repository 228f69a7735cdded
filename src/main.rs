//! Gateway binary: serves the proxy routes on `GATEWAY_BIND_ADDR`.

// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use marketplace_gateway::{
	config::Settings,
	proxy::{self, AppState},
};

const DEFAULT_FILTER: &str = "info,marketplace_gateway=debug,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	init_tracing();

	let settings = Settings::from_env();
	let addr = settings.bind_addr()?;
	let state = AppState::new(settings)?;

	tracing::info!(%addr, backend = %state.backend_url(), "starting marketplace gateway");

	let listener = TcpListener::bind(addr).await?;

	axum::serve(listener, proxy::router(state)).with_graceful_shutdown(shutdown_signal()).await?;

	tracing::info!("marketplace gateway stopped");

	Ok(())
}

fn init_tracing() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

	tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}
}
