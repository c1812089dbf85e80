//! Token flows powering the provisioning client.
//!
//! [`TokenCache`] owns the one access token the gateway holds for the provisioning API. The
//! token is fetched lazily, reused until `now >= expires_at`, and renewed under a single-flight
//! guard so concurrent callers piggy-back on one in-flight renewal instead of stampeding the
//! identity provider.

mod client_credentials;

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	http::UpstreamHttpClient,
	oauth::ClientCredentialsGrant,
};

/// Cached client-credentials token with single-flight renewal.
///
/// States: absent (nothing cached), valid (`now < expires_at`), expired. Absent and expired
/// both lead to a renewal on the next [`TokenCache::access_token`] call; there is no other
/// invalidation path besides [`TokenCache::invalidate`].
pub struct TokenCache<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	/// HTTP client used for token renewals.
	pub http_client: Arc<C>,
	/// Grant posted to the identity provider.
	pub grant: ClientCredentialsGrant,
	current: Mutex<Option<AccessToken>>,
	renewal_guard: AsyncMutex<()>,
}
impl<C> TokenCache<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	/// Creates an empty cache that renews through `http_client`.
	pub fn new(grant: ClientCredentialsGrant, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			grant,
			current: Mutex::new(None),
			renewal_guard: AsyncMutex::new(()),
		}
	}

	/// Returns a copy of the cached token, valid or not.
	pub fn current(&self) -> Option<AccessToken> {
		self.current.lock().clone()
	}

	/// Seeds the cache with an already issued token, replacing any cached one.
	pub fn prime(&self, token: AccessToken) {
		*self.current.lock() = Some(token);
	}

	/// Drops the cached token so the next call renews.
	pub fn invalidate(&self) {
		self.current.lock().take();
	}

	fn valid_at(&self, now: OffsetDateTime) -> Option<AccessToken> {
		self.current.lock().as_ref().filter(|token| !token.is_expired_at(now)).cloned()
	}
}
impl<C> Debug for TokenCache<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("token_url", &self.grant.token_url.as_str())
			.field("client_id", &self.grant.client_id)
			.field("current", &self.current.lock().as_ref())
			.finish()
	}
}
