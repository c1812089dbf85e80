//! Gateway-level error types shared by the proxy, the provisioning client, and the token cache.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream API answered with a non-success status.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Identity provider did not hand out a usable token.
	#[error(transparent)]
	Token(#[from] TokenError),

	/// Upstream JSON did not match the expected shape.
	#[error("Upstream returned JSON that does not match the expected shape.")]
	Decode {
		/// Structured parsing failure, including the path of the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Outbound payload could not be serialized.
	#[error("Request payload could not be serialized to JSON.")]
	Encode {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
	fn from(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Decode { source }
	}
}

/// Configuration and validation failures raised while wiring the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required environment variable is absent or empty.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds a value that is not a URL.
	#[error("Environment variable `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Variable name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A URL cannot carry path segments (e.g. `mailto:`).
	#[error("URL `{url}` cannot be used as a base URL.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Listener address cannot be parsed.
	#[error("Bind address `{value}` is invalid.")]
	InvalidBindAddr {
		/// Raw value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: std::net::AddrParseError,
	},
	/// Router prefix is empty, `/`, or does not start with `/`.
	#[error("Route prefix `{value}` must start with `/` and name at least one segment.")]
	InvalidPrefix {
		/// Raw value.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// `METHOD url` of the failed call.
		target: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		target: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { target: target.into(), source: Box::new(src) }
	}
}

/// Non-success response returned by an upstream API.
#[derive(Debug, ThisError)]
#[error("Upstream responded with {status} to {target}.")]
pub struct UpstreamError {
	/// `METHOD path` of the failed call.
	pub target: String,
	/// Upstream HTTP status.
	pub status: StatusCode,
	/// Upstream `Content-Type`, when supplied.
	pub content_type: Option<String>,
	/// Upstream body, untouched.
	pub body: Bytes,
}

/// Failures raised while renewing the client-credentials token.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Identity provider rejected the grant.
	#[error("Token endpoint rejected the client credentials grant with {status}.")]
	Rejected {
		/// HTTP status returned by the token endpoint.
		status: StatusCode,
		/// Body preview returned by the token endpoint.
		body: String,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint returned an `expires_in` that is not an integer.
	#[error("The expires_in value `{value}` is not an integer.")]
	InvalidExpiresIn {
		/// Raw value.
		value: String,
	},
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn upstream_error_mentions_status_and_target() {
		let err: Error = UpstreamError {
			target: "GET /v1/operations/42".into(),
			status: StatusCode::NOT_FOUND,
			content_type: None,
			body: Bytes::from_static(b"{}"),
		}
		.into();

		assert!(matches!(err, Error::Upstream(_)));
		assert_eq!(
			err.to_string(),
			"Upstream responded with 404 Not Found to GET /v1/operations/42."
		);
	}

	#[test]
	fn decode_error_exposes_field_path() {
		let de = &mut serde_json::Deserializer::from_str("{\"projects\":[1]}");
		let source = serde_path_to_error::deserialize::<_, BTreeMap<String, Vec<String>>>(de)
			.expect_err("Numeric project names should fail to deserialize.");
		let err = Error::from(source);
		let inner = StdError::source(&err).expect("Decode errors should expose their source.");

		assert!(inner.to_string().starts_with("projects[0]"));
	}
}
