//! Gateway entry point: loads the environment, wires the components, and serves until Ctrl-C.

// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use provisioning_gateway::{
	config::GatewayConfig,
	server::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.with(tracing_subscriber::fmt::layer())
		.init();

	let config = GatewayConfig::from_env()?;
	let state = AppState::from_config(&config)?;
	let app = server::build_router(state, &config.server);
	let listener = TcpListener::bind(config.server.bind_addr).await?;

	tracing::info!(
		addr = %config.server.bind_addr,
		github_prefix = %config.server.github_prefix,
		provisioning_prefix = %config.server.provisioning_prefix,
		"gateway listening"
	);

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to listen for the shutdown signal");

		std::future::pending::<()>().await;
	}

	tracing::info!("shutting down");
}
