//! HTTP surface of the gateway.
//!
//! The passthrough proxy is mounted under the GitHub prefix and accepts GET/POST/PUT/DELETE on
//! any path below it. The provisioning client is exposed as a small JSON API under the
//! provisioning prefix. Every request is traced through `tower-http`'s [`TraceLayer`].

pub mod error;
pub mod routes;

pub use error::*;

// crates.io
use axum::{
	Router,
	routing::{delete, get, put},
};
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	config::{GatewayConfig, ServerConfig},
	error::ConfigError,
	http::ReqwestHttpClient,
	provisioning::ReqwestProvisioningClient,
	proxy::ReqwestGithubProxy,
};

/// Shared state injected into every handler.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Passthrough proxy towards the GitHub-compatible API.
	pub github: Arc<ReqwestGithubProxy>,
	/// Provisioning API client, including its token cache.
	pub provisioning: Arc<ReqwestProvisioningClient>,
}
impl AppState {
	/// Wires both components over one shared reqwest transport.
	pub fn from_config(config: &GatewayConfig) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_http_client(config, ReqwestHttpClient::with_client(client))
	}

	/// Wires both components over the provided transport.
	pub fn with_http_client(
		config: &GatewayConfig,
		http_client: impl Into<Arc<ReqwestHttpClient>>,
	) -> Result<Self> {
		let http_client = http_client.into();

		Ok(Self {
			github: Arc::new(ReqwestGithubProxy::with_http_client(
				&config.github,
				http_client.clone(),
			)),
			provisioning: Arc::new(ReqwestProvisioningClient::with_http_client(
				&config.provisioning,
				http_client,
			)?),
		})
	}
}

/// Builds the gateway router with both components mounted under their prefixes.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
	let github = Router::new()
		.route(
			"/",
			get(routes::forward_root)
				.post(routes::forward_root)
				.put(routes::forward_root)
				.delete(routes::forward_root),
		)
		.route(
			"/*path",
			get(routes::forward).post(routes::forward).put(routes::forward).delete(routes::forward),
		);
	let provisioning = Router::new()
		.route(
			"/clusters/:cluster/projects",
			get(routes::list_projects).post(routes::create_project),
		)
		.route("/clusters/:cluster/projects/:project", delete(routes::delete_project))
		.route(
			"/clusters/:cluster/projects/:project/rolebindings",
			get(routes::list_role_bindings),
		)
		.route(
			"/clusters/:cluster/projects/:project/rolebindings/users",
			put(routes::add_role_binding).delete(routes::delete_role_binding),
		)
		.route("/operations/:operation_id", get(routes::operation_result))
		.route("/operations/:operation_id/rolebindings", get(routes::role_binding_result));

	Router::new()
		.route("/healthz", get(routes::health))
		.nest(&config.github_prefix, github)
		.nest(&config.provisioning_prefix, provisioning)
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
