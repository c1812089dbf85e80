//! Translation of gateway errors into client-visible HTTP responses.

// crates.io
use axum::{
	Json,
	http::{HeaderValue, header::CONTENT_TYPE},
	response::{IntoResponse, Response},
};
// self
use crate::_prelude::*;

/// JSON body returned for failures that do not replay an upstream response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Stable machine-readable code.
	pub code: String,
	/// Human-readable message.
	pub message: String,
}

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
	/// Failure raised by the proxy, the provisioning client, or the token cache.
	Gateway(Error),
	/// The requested entry does not exist.
	NotFound {
		/// Human-readable message.
		message: String,
	},
}
impl ApiError {
	/// Builds a 404 error.
	pub fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound { message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		Self::Gateway(e)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let err = match self {
			Self::NotFound { message } =>
				return json_error(StatusCode::NOT_FOUND, "not_found", message),
			Self::Gateway(Error::Upstream(upstream)) => {
				// Replay the upstream status and body untouched.
				tracing::warn!(
					target_call = %upstream.target,
					status = upstream.status.as_u16(),
					"upstream rejected request"
				);

				let mut response = (upstream.status, upstream.body).into_response();

				if let Some(value) =
					upstream.content_type.and_then(|value| HeaderValue::from_str(&value).ok())
				{
					response.headers_mut().insert(CONTENT_TYPE, value);
				}

				return response;
			},
			Self::Gateway(err) => err,
		};
		let (status, code) = match &err {
			Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration"),
			Error::Encode { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "payload_encoding"),
			Error::Transport(_) => (StatusCode::BAD_GATEWAY, "upstream_unreachable"),
			Error::Token(_) => (StatusCode::BAD_GATEWAY, "token_renewal_failed"),
			Error::Decode { .. } => (StatusCode::BAD_GATEWAY, "upstream_malformed"),
			Error::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
		};

		tracing::error!(error = %err, code, "request failed");

		json_error(status, code, err.to_string())
	}
}

fn json_error(status: StatusCode, code: &str, message: String) -> Response {
	(status, Json(ErrorResponse { code: code.into(), message })).into_response()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{TokenError, UpstreamError};

	#[test]
	fn upstream_errors_replay_status_and_body() {
		let response = ApiError::from(Error::from(UpstreamError {
			target: "GET /repos/octo/missing".into(),
			status: StatusCode::NOT_FOUND,
			content_type: Some("application/json; charset=utf-8".into()),
			body: Bytes::from_static(b"{\"message\":\"Not Found\"}"),
		}))
		.into_response();

		assert_eq!(response.status(), StatusCode::NOT_FOUND);
		assert_eq!(
			response.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some("application/json; charset=utf-8")
		);
	}

	#[test]
	fn local_failures_map_to_gateway_codes() {
		let token = ApiError::from(Error::from(TokenError::NonPositiveExpiresIn)).into_response();
		let missing = ApiError::not_found("nothing here").into_response();
		let source = serde_json::from_str::<Value>("{").expect_err("Truncated JSON should fail.");
		let encode = ApiError::from(Error::Encode { source }).into_response();

		assert_eq!(token.status(), StatusCode::BAD_GATEWAY);
		assert_eq!(encode.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(missing.status(), StatusCode::NOT_FOUND);
	}
}
