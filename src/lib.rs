//! Thin HTTP gateway: a passthrough proxy for a GitHub-compatible API plus a typed client for a
//! project provisioning API guarded by a single-flight OAuth 2.0 client-credentials token cache.

#![deny(clippy::all, missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provisioning;
pub mod proxy;
pub mod server;

#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::TokenSecret,
		config::{GithubConfig, ProvisioningConfig},
		http::ReqwestHttpClient,
		provisioning::ReqwestProvisioningClient,
		proxy::ReqwestGithubProxy,
	};

	/// Client id used by test configurations.
	pub const TEST_CLIENT_ID: &str = "gateway-client";
	/// Client secret used by test configurations.
	pub const TEST_CLIENT_SECRET: &str = "gateway-secret";
	/// Scope used by test configurations.
	pub const TEST_SCOPE: &str = "oseaas:projects";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Provisioning configuration whose API and identity provider both live at `base_url`.
	pub fn test_provisioning_config(base_url: &str) -> ProvisioningConfig {
		let base = Url::parse(base_url).expect("Mock server base URL should parse.");

		ProvisioningConfig {
			api_url: base.clone(),
			identity_url: base,
			client_id: TEST_CLIENT_ID.into(),
			client_secret: TokenSecret::new(TEST_CLIENT_SECRET),
			scope: TEST_SCOPE.into(),
			redirect_uri: Url::parse(crate::config::DEFAULT_REDIRECT_URI)
				.expect("Default redirect URI should parse."),
		}
	}

	/// Builds a provisioning client pointed at a mock server.
	pub fn build_test_provisioning_client(base_url: &str) -> ReqwestProvisioningClient {
		ReqwestProvisioningClient::with_http_client(
			&test_provisioning_config(base_url),
			test_reqwest_http_client(),
		)
		.expect("Provisioning client should build from test config.")
	}

	/// Builds a GitHub proxy pointed at a mock server with the provided static token.
	pub fn build_test_github_proxy(base_url: &str, token: &str) -> ReqwestGithubProxy {
		let config = GithubConfig {
			base_url: Url::parse(base_url).expect("Mock server base URL should parse."),
			token: TokenSecret::new(token),
		};

		ReqwestGithubProxy::with_http_client(&config, test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use bytes::Bytes;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
