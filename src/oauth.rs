//! Client-credentials grant against the identity provider's JSON token endpoint.
//!
//! The identity provider accepts a JSON body (not the form encoding of RFC 6749) and answers
//! with `{access_token, expires_in, ...}`. `expires_in` arrives either as a number or as a
//! numeric string.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenSecret},
	config::ProvisioningConfig,
	error::TokenError,
	http::{self, UpstreamHttpClient, UpstreamRequest},
};

/// Path of the token endpoint relative to the identity provider base URL.
pub const TOKEN_PATH: [&str; 3] = ["v2", "oauth2", "token"];

const GRANT_TYPE: &str = "client_credentials";
const RESPONSE_TYPE: &str = "code";
const BODY_PREVIEW_LIMIT: usize = 512;

/// Static description of the client-credentials grant sent to the identity provider.
#[derive(Clone, Debug)]
pub struct ClientCredentialsGrant {
	/// Absolute token endpoint URL.
	pub token_url: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// Redirect URI registered for the client.
	pub redirect_uri: Url,
	/// Requested scope.
	pub scope: String,
}
impl ClientCredentialsGrant {
	/// Builds the grant from the provisioning configuration.
	pub fn from_config(config: &ProvisioningConfig) -> Result<Self> {
		Ok(Self {
			token_url: http::endpoint(&config.identity_url, TOKEN_PATH)?,
			client_id: config.client_id.clone(),
			client_secret: config.client_secret.clone(),
			redirect_uri: config.redirect_uri.clone(),
			scope: config.scope.clone(),
		})
	}

	/// JSON payload posted to the token endpoint.
	pub fn payload(&self) -> Value {
		serde_json::json!({
			"grant_type": GRANT_TYPE,
			"client_id": self.client_id,
			"client_secret": self.client_secret.expose(),
			"redirect_uri": self.redirect_uri.as_str(),
			"response_type": RESPONSE_TYPE,
			"scope": self.scope,
		})
	}

	/// Performs the grant and converts the response into an [`AccessToken`] issued now.
	pub async fn exchange<C>(&self, client: &C) -> Result<AccessToken>
	where
		C: ?Sized + UpstreamHttpClient,
	{
		let request =
			UpstreamRequest::new(Method::POST, self.token_url.clone()).json(&self.payload());
		let response = http::send(client, request).await.map_err(|err| match err {
			Error::Upstream(upstream) => Error::from(TokenError::Rejected {
				status: upstream.status,
				body: preview(&upstream.body),
			}),
			other => other,
		})?;
		let de = &mut serde_json::Deserializer::from_slice(&response.body);
		let parsed: TokenResponse = serde_path_to_error::deserialize(de)
			.map_err(|source| TokenError::Parse { source })?;

		parsed.into_access_token(OffsetDateTime::now_utc())
	}
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	expires_in: ExpiresIn,
}
impl TokenResponse {
	fn into_access_token(self, issued_at: OffsetDateTime) -> Result<AccessToken> {
		let seconds = self.expires_in.seconds()?;

		if seconds <= 0 {
			return Err(TokenError::NonPositiveExpiresIn.into());
		}

		let expires_in = Duration::seconds(seconds);

		issued_at.checked_add(expires_in).ok_or(TokenError::ExpiresInOutOfRange)?;

		Ok(AccessToken::issued(self.access_token, issued_at, expires_in))
	}
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
	Seconds(i64),
	Text(String),
}
impl ExpiresIn {
	fn seconds(&self) -> Result<i64, TokenError> {
		match self {
			Self::Seconds(value) => Ok(*value),
			Self::Text(raw) => raw
				.trim()
				.parse()
				.map_err(|_| TokenError::InvalidExpiresIn { value: raw.clone() }),
		}
	}
}

fn preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	match text.char_indices().nth(BODY_PREVIEW_LIMIT) {
		Some((idx, _)) => format!("{}...", &text[..idx]),
		None => text.into_owned(),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn parse(raw: &str) -> Result<AccessToken> {
		let response: TokenResponse =
			serde_json::from_str(raw).expect("Token response fixture should deserialize.");

		response.into_access_token(macros::datetime!(2025-01-01 00:00 UTC))
	}

	#[test]
	fn grant_targets_v2_token_endpoint() {
		let config = crate::_preludet::test_provisioning_config("https://iam.example.com/base/");
		let grant =
			ClientCredentialsGrant::from_config(&config).expect("Grant should build from config.");
		let payload = grant.payload();

		assert_eq!(grant.token_url.as_str(), "https://iam.example.com/base/v2/oauth2/token");
		assert_eq!(payload["grant_type"], "client_credentials");
		assert_eq!(payload["client_id"], crate::_preludet::TEST_CLIENT_ID);
		assert_eq!(payload["client_secret"], crate::_preludet::TEST_CLIENT_SECRET);
		assert_eq!(payload["redirect_uri"], crate::config::DEFAULT_REDIRECT_URI);
		assert_eq!(payload["scope"], crate::_preludet::TEST_SCOPE);
	}

	#[test]
	fn expires_in_accepts_numbers_and_numeric_strings() {
		let numeric =
			parse("{\"access_token\":\"a\",\"expires_in\":3600,\"token_type\":\"bearer\"}")
				.expect("Numeric expires_in should be accepted.");
		let textual = parse("{\"access_token\":\"b\",\"expires_in\":\"1800\"}")
			.expect("String expires_in should be accepted.");

		assert_eq!(numeric.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert_eq!(textual.expires_at, macros::datetime!(2025-01-01 00:30 UTC));
		assert_eq!(textual.access_token.expose(), "b");
	}

	#[test]
	fn unusable_expiry_is_rejected() {
		assert!(matches!(
			parse("{\"access_token\":\"a\",\"expires_in\":0}"),
			Err(Error::Token(TokenError::NonPositiveExpiresIn))
		));
		assert!(matches!(
			parse("{\"access_token\":\"a\",\"expires_in\":\"soon\"}"),
			Err(Error::Token(TokenError::InvalidExpiresIn { .. }))
		));
		assert!(matches!(
			parse("{\"access_token\":\"a\",\"expires_in\":9223372036854775807}"),
			Err(Error::Token(TokenError::ExpiresInOutOfRange))
		));
	}

	#[test]
	fn preview_truncates_long_bodies() {
		let body = "x".repeat(BODY_PREVIEW_LIMIT + 10);

		assert_eq!(preview(body.as_bytes()).len(), BODY_PREVIEW_LIMIT + 3);
		assert_eq!(preview(b"short"), "short");
	}
}
