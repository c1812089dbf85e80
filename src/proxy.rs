//! Passthrough proxy towards a GitHub-compatible REST API.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::GithubConfig,
	error::ConfigError,
	http::{self, ReqwestHttpClient, UpstreamHttpClient, UpstreamRequest},
	obs::{self, CallKind},
};

/// Proxy specialized for the crate's default reqwest transport.
pub type ReqwestGithubProxy = GithubProxy<ReqwestHttpClient>;

/// Forwards requests verbatim to the configured base URL with a static bearer token.
pub struct GithubProxy<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	/// HTTP client used for proxied calls.
	pub http_client: Arc<C>,
	/// Base URL every proxied path is appended to.
	pub base_url: Url,
	token: TokenSecret,
}
impl<C> GithubProxy<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	/// Creates a proxy that reuses the caller-provided transport.
	pub fn with_http_client(config: &GithubConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			base_url: config.base_url.clone(),
			token: config.token.clone(),
		}
	}

	/// Forwards `method path` upstream and returns the upstream body untouched.
	///
	/// `path` is relative to the base URL; an empty path targets the base URL itself. The body
	/// is forwarded for POST and PUT only; GET and DELETE are sent without one. Non-success statuses surface as
	/// [`Error::Upstream`](crate::error::Error::Upstream).
	pub async fn forward(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<Bytes> {
		obs::observe(CallKind::Proxy, "forward", async move {
			let path = path.trim_start_matches('/');
			let url = if path.is_empty() {
				self.base_url.clone()
			} else {
				http::endpoint(&self.base_url, path.split('/'))?
			};
			let forwards_body = matches!(method, Method::POST | Method::PUT);
			let mut request = UpstreamRequest::new(method, url).bearer(&self.token);

			if let Some(body) = body.filter(|body| forwards_body && !body.is_empty()) {
				request = request.body(body);
			}

			Ok(http::send(self.http_client.as_ref(), request).await?.body)
		})
		.await
	}
}
impl GithubProxy<ReqwestHttpClient> {
	/// Creates a proxy that provisions its own reqwest transport.
	pub fn from_config(config: &GithubConfig) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Ok(Self::with_http_client(config, ReqwestHttpClient::with_client(client)))
	}
}
impl<C> Debug for GithubProxy<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GithubProxy")
			.field("base_url", &self.base_url.as_str())
			.field("token", &self.token)
			.finish()
	}
}
