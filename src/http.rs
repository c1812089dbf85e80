//! Transport primitives for upstream calls.
//!
//! The module exposes [`UpstreamHttpClient`] alongside [`UpstreamRequest`] and
//! [`UpstreamResponse`] so the proxy, the provisioning client, and the token cache share one
//! seam to the network. [`ReqwestHttpClient`] is the production implementation; tests can plug
//! in recording transports without a socket.

// crates.io
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, TransportError, UpstreamError},
};

/// Boxed future returned by [`UpstreamHttpClient::execute`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<UpstreamResponse>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing upstream calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// component behind an `Arc`. A non-success status is not a transport failure: implementations
/// return the response and leave status classification to [`send`].
pub trait UpstreamHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and buffers the full response body.
	fn execute(&self, request: UpstreamRequest) -> TransportFuture<'_>;
}

/// Outbound call description.
#[derive(Clone, Debug)]
pub struct UpstreamRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Bearer credential attached as `Authorization`, if any.
	pub bearer: Option<TokenSecret>,
	/// JSON payload, if any. Sent with `Content-Type: application/json`.
	pub body: Option<Bytes>,
}
impl UpstreamRequest {
	/// Creates a request without credentials or payload.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, bearer: None, body: None }
	}

	/// Attaches a bearer credential.
	pub fn bearer(mut self, token: &TokenSecret) -> Self {
		self.bearer = Some(token.clone());

		self
	}

	/// Attaches raw JSON bytes as the payload.
	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `value` as the payload.
	pub fn json(self, value: &Value) -> Self {
		self.body(value.to_string())
	}

	/// `METHOD path` label used in logs and errors.
	pub fn target(&self) -> String {
		format!("{} {}", self.method, self.url.path())
	}
}

/// Buffered upstream response.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// `Content-Type` header, when present and valid UTF-8.
	pub content_type: Option<String>,
	/// Full response body.
	pub body: Bytes,
}
impl UpstreamResponse {
	/// Converts non-success statuses into [`UpstreamError`].
	pub fn error_for_status(self, target: impl Into<String>) -> Result<Self> {
		if self.status.is_success() {
			return Ok(self);
		}

		Err(UpstreamError {
			target: target.into(),
			status: self.status,
			content_type: self.content_type,
			body: self.body,
		}
		.into())
	}

	/// Deserializes the body, reporting the path of the first mismatching field on failure.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let de = &mut serde_json::Deserializer::from_slice(&self.body);

		Ok(serde_path_to_error::deserialize(de)?)
	}

	/// Parses the body as untyped JSON; an empty body yields `null`.
	pub fn json_value(&self) -> Result<Value> {
		if self.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Null);
		}

		self.json()
	}
}

/// Executes `request` on `client` and rejects non-success statuses.
pub async fn send<C>(client: &C, request: UpstreamRequest) -> Result<UpstreamResponse>
where
	C: ?Sized + UpstreamHttpClient,
{
	let target = request.target();

	tracing::debug!(%target, "calling upstream");

	let response = client.execute(request).await?;

	tracing::debug!(%target, status = response.status.as_u16(), "upstream responded");

	response.error_for_status(target)
}

/// Appends percent-encoded path `segments` to `base`, keeping the base path.
pub fn endpoint<I, S>(base: &Url, segments: I) -> Result<Url>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::CannotBeABase { url: base.to_string() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl UpstreamHttpClient for ReqwestHttpClient {
	fn execute(&self, request: UpstreamRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let target = request.target();
			let mut builder = self.0.request(request.method, request.url);

			if let Some(token) = &request.bearer {
				builder = builder.header(AUTHORIZATION, token.bearer());
			}
			if let Some(body) = request.body {
				builder = builder.header(CONTENT_TYPE, "application/json").body(body);
			}

			let response = builder.send().await.map_err(|e| map_reqwest_error(&target, e))?;
			let status = response.status();
			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.bytes().await.map_err(|e| map_reqwest_error(&target, e))?;

			Ok(UpstreamResponse { status, content_type, body })
		})
	}
}

fn map_reqwest_error(target: &str, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::network(target, err).into()
}
