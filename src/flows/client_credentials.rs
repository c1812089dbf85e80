//! Client-credentials renewal with a singleflight guard.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	flows::TokenCache,
	http::UpstreamHttpClient,
	obs::{self, CallKind},
};

impl<C> TokenCache<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	/// Returns a token that is valid right now, renewing it first when absent or expired.
	///
	/// Renewal failures propagate unchanged; nothing is retried.
	pub async fn access_token(&self) -> Result<AccessToken> {
		if let Some(token) = self.valid_at(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.renewal_guard.lock().await;

		// Another caller may have renewed while this one waited for the guard.
		if let Some(token) = self.valid_at(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let token = obs::observe(
			CallKind::TokenRenewal,
			"client_credentials",
			self.grant.exchange(self.http_client.as_ref()),
		)
		.await?;

		tracing::info!(
			fingerprint = %token.access_token.fingerprint(),
			expires_at = %token.expires_at,
			"access token renewed"
		);

		self.prime(token.clone());

		Ok(token)
	}
}
