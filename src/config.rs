//! Gateway configuration sourced from environment variables at start-up.
//!
//! Loading goes through a lookup function so callers (and tests) can supply variables without
//! touching the process environment. Nothing is reloaded after start-up.

// std
use std::net::SocketAddr;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Default listener address.
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
/// Default mount prefix of the GitHub passthrough proxy.
pub const DEFAULT_GITHUB_PREFIX: &str = "/github";
/// Default mount prefix of the provisioning routes.
pub const DEFAULT_PROVISIONING_PREFIX: &str = "/oseaas";
/// Redirect URI registered for the client-credentials grant.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/v2/documentation/oauth2-redirect.html";

/// Complete gateway configuration.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
	/// Listener and routing settings.
	pub server: ServerConfig,
	/// Upstream GitHub-compatible API.
	pub github: GithubConfig,
	/// Upstream provisioning API and its identity provider.
	pub provisioning: ProvisioningConfig,
}
impl GatewayConfig {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`, which returns the value of a variable by name.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let vars = Vars(lookup);

		Ok(Self {
			server: ServerConfig {
				bind_addr: {
					let value =
						vars.optional("GATEWAY_BIND").unwrap_or_else(|| DEFAULT_BIND.into());

					value
						.parse::<SocketAddr>()
						.map_err(|source| ConfigError::InvalidBindAddr { value, source })?
				},
				github_prefix: prefix(
					vars.optional("GATEWAY_GITHUB_PREFIX")
						.unwrap_or_else(|| DEFAULT_GITHUB_PREFIX.into()),
				)?,
				provisioning_prefix: prefix(
					vars.optional("GATEWAY_PROVISIONING_PREFIX")
						.unwrap_or_else(|| DEFAULT_PROVISIONING_PREFIX.into()),
				)?,
			},
			github: GithubConfig {
				base_url: vars.url("GITHUB_URL")?,
				token: TokenSecret::new(vars.required("GITHUB_TOKEN")?),
			},
			provisioning: ProvisioningConfig {
				api_url: vars.url("OPENSHIFT_URL")?,
				identity_url: vars.url("IAMAAS_URL")?,
				client_id: vars.required("CLIENT_ID")?,
				client_secret: TokenSecret::new(vars.required("CLIENT_SECRET")?),
				scope: vars.required("SCOPE")?,
				redirect_uri: match vars.optional("OAUTH_REDIRECT_URI") {
					Some(value) => Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
						name: "OAUTH_REDIRECT_URI",
						source,
					})?,
					None => Url::parse(DEFAULT_REDIRECT_URI).map_err(|source| {
						ConfigError::InvalidUrl { name: "OAUTH_REDIRECT_URI", source }
					})?,
				},
			},
		})
	}
}

/// Listener and routing settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
	/// Socket the HTTP server binds to.
	pub bind_addr: SocketAddr,
	/// Mount prefix of the passthrough proxy.
	pub github_prefix: String,
	/// Mount prefix of the provisioning routes.
	pub provisioning_prefix: String,
}

/// Upstream GitHub-compatible API settings.
#[derive(Clone, Debug)]
pub struct GithubConfig {
	/// Base URL every proxied path is appended to.
	pub base_url: Url,
	/// Static bearer token attached to every proxied request.
	pub token: TokenSecret,
}

/// Upstream provisioning API and identity provider settings.
#[derive(Clone, Debug)]
pub struct ProvisioningConfig {
	/// Provisioning API base URL.
	pub api_url: Url,
	/// Identity provider base URL; the token endpoint lives at `/v2/oauth2/token`.
	pub identity_url: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// Scope requested with every grant.
	pub scope: String,
	/// Redirect URI sent alongside the grant.
	pub redirect_uri: Url,
}

struct Vars<F>(F);
impl<F> Vars<F>
where
	F: Fn(&str) -> Option<String>,
{
	fn optional(&self, name: &str) -> Option<String> {
		(self.0)(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
	}

	fn required(&self, name: &'static str) -> Result<String, ConfigError> {
		self.optional(name).ok_or(ConfigError::MissingVar { name })
	}

	fn url(&self, name: &'static str) -> Result<Url, ConfigError> {
		let raw = self.required(name)?;
		let url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { name, source })?;

		if url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeABase { url: raw });
		}

		Ok(url)
	}
}

fn prefix(value: String) -> Result<String, ConfigError> {
	let trimmed = value.trim_end_matches('/');

	if !trimmed.starts_with('/') || trimmed.len() < 2 {
		return Err(ConfigError::InvalidPrefix { value });
	}

	Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn base_vars() -> HashMap<&'static str, &'static str> {
		HashMap::from([
			("GITHUB_URL", "https://github.example.com/api/v3"),
			("GITHUB_TOKEN", "gh-token"),
			("OPENSHIFT_URL", "https://oseaas.example.com"),
			("IAMAAS_URL", "https://iam.example.com"),
			("CLIENT_ID", "client"),
			("CLIENT_SECRET", "secret"),
			("SCOPE", "openid"),
		])
	}

	fn load(vars: &HashMap<&'static str, &'static str>) -> Result<GatewayConfig, ConfigError> {
		GatewayConfig::from_lookup(|name| vars.get(name).map(|value| (*value).to_owned()))
	}

	#[test]
	fn loads_required_vars_and_defaults() {
		let config = load(&base_vars()).expect("Complete environment should load.");

		assert_eq!(config.server.bind_addr.to_string(), DEFAULT_BIND);
		assert_eq!(config.server.github_prefix, "/github");
		assert_eq!(config.server.provisioning_prefix, "/oseaas");
		assert_eq!(config.github.base_url.as_str(), "https://github.example.com/api/v3");
		assert_eq!(config.github.token.expose(), "gh-token");
		assert_eq!(config.provisioning.redirect_uri.as_str(), DEFAULT_REDIRECT_URI);
		assert!(!format!("{config:?}").contains("gh-token"));
	}

	#[test]
	fn missing_and_blank_vars_are_rejected() {
		let mut vars = base_vars();

		vars.remove("CLIENT_SECRET");

		assert!(matches!(
			load(&vars),
			Err(ConfigError::MissingVar { name: "CLIENT_SECRET" })
		));

		vars.insert("CLIENT_SECRET", "secret");
		vars.insert("SCOPE", "   ");

		assert!(matches!(load(&vars), Err(ConfigError::MissingVar { name: "SCOPE" })));
	}

	#[test]
	fn malformed_values_are_rejected() {
		let mut vars = base_vars();

		vars.insert("IAMAAS_URL", "not a url");

		assert!(matches!(load(&vars), Err(ConfigError::InvalidUrl { name: "IAMAAS_URL", .. })));

		let mut vars = base_vars();

		vars.insert("GITHUB_URL", "mailto:octo@example.com");

		assert!(matches!(load(&vars), Err(ConfigError::CannotBeABase { .. })));

		let mut vars = base_vars();

		vars.insert("GATEWAY_BIND", "localhost");

		assert!(matches!(load(&vars), Err(ConfigError::InvalidBindAddr { .. })));

		let mut vars = base_vars();

		vars.insert("GATEWAY_GITHUB_PREFIX", "/");

		assert!(matches!(load(&vars), Err(ConfigError::InvalidPrefix { .. })));
	}

	#[test]
	fn prefixes_drop_trailing_slashes() {
		let mut vars = base_vars();

		vars.insert("GATEWAY_PROVISIONING_PREFIX", "/api/oseaas/");

		let config = load(&vars).expect("Prefix with trailing slash should load.");

		assert_eq!(config.server.provisioning_prefix, "/api/oseaas");
	}
}
