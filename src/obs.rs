//! Optional observability helpers for grant completions.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps every completion in a span named `oauth2_issuer.grant` with the
//!   `grant` (identifier) and `stage` (call site) fields and emits issuance/failure events. Token
//!   values never reach the subscriber; only [`TokenSecret::fingerprint`] does.
//! - `metrics` increments the `oauth2_issuer_grant_total` counter for every
//!   attempt/success/failure, labeled by `grant` + `outcome`.
//!
//! [`TokenSecret::fingerprint`]: crate::auth::TokenSecret::fingerprint

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantOutcome {
	/// Entry to a grant handler.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl GrantOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantOutcome::Attempt => "attempt",
			GrantOutcome::Success => "success",
			GrantOutcome::Failure => "failure",
		}
	}
}
impl Display for GrantOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
