//! Observability helpers for upstream calls.
//!
//! - Every upstream call runs inside a `provisioning_gateway.call` span carrying the `call`
//!   (component) and `stage` (operation) fields.
//! - Enable the `metrics` feature to increment the `provisioning_gateway_call_total` counter for
//!   every attempt/success/failure, labeled by `call` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Gateway components that reach an upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Passthrough proxy towards the GitHub-compatible API.
	Proxy,
	/// Provisioning API operations.
	Provisioning,
	/// Client-credentials renewals against the identity provider.
	TokenRenewal,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Proxy => "proxy",
			CallKind::Provisioning => "provisioning",
			CallKind::TokenRenewal => "token_renewal",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a gateway helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a [`CallSpan`] and records attempt + outcome metrics around it.
pub async fn observe<T, Fut>(kind: CallKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::new(kind, stage);

	record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_call_outcome(kind, CallOutcome::Success),
		Err(e) => {
			::tracing::warn!(call = kind.as_str(), stage, error = %e, "upstream call failed");
			record_call_outcome(kind, CallOutcome::Failure);
		},
	}

	result
}
