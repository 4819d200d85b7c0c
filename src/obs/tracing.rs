// self
use crate::{
	_prelude::*,
	auth::{AccessTokenId, SessionId, SessionKey},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedGrant<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedGrant<F> = F;

/// A span builder used by grant handlers.
#[derive(Clone, Debug)]
pub struct GrantSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl GrantSpan {
	/// Creates a new span tagged with the provided grant identifier + stage.
	pub fn new(grant: &str, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_issuer.grant", grant, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (grant, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedGrant<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

pub(crate) fn session_replaced(key: &SessionKey, session: SessionId) {
	#[cfg(feature = "tracing")]
	tracing::debug!(key = %key, session = session.get(), "Session replaced.");

	#[cfg(not(feature = "tracing"))]
	let _ = (key, session);
}

pub(crate) fn empty_scope_request(key: &SessionKey) {
	#[cfg(feature = "tracing")]
	tracing::warn!(key = %key, "Issuing an access token without any scope.");

	#[cfg(not(feature = "tracing"))]
	let _ = key;
}

pub(crate) fn token_issued(
	session: SessionId,
	access_token: AccessTokenId,
	fingerprint: &str,
	expires_in: i64,
	scopes: usize,
) {
	#[cfg(feature = "tracing")]
	tracing::info!(
		session = session.get(),
		access_token = access_token.get(),
		fingerprint,
		expires_in,
		scopes,
		"Access token issued."
	);

	#[cfg(not(feature = "tracing"))]
	let _ = (session, access_token, fingerprint, expires_in, scopes);
}

pub(crate) fn grant_failed(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %error, code = error.oauth_error_code(), "Grant completion failed.");

	#[cfg(not(feature = "tracing"))]
	let _ = error;
}
