//! Implicit grant: mints a bearer token straight for the user-agent.
//!
//! No authorization code and no refresh token are ever produced. Each completion replaces the
//! owner's session with the client, stores a fresh access token against it, and associates the
//! requested scopes. The token value is generated and the expiry computed before the store is
//! touched, so entropy and configuration failures leave existing sessions intact. A storage
//! failure after the session was replaced can still leave a session without a token (or a token
//! with only some of its scopes) behind; the caller only ever sees the error.

// self
use crate::{
	_prelude::*,
	auth::{SessionKey, TokenResponse},
	config,
	error::ConfigError,
	grant::{AuthParams, Grant, GrantFuture, GrantMetrics, GrantType, ResponseType},
	obs::{self, GrantOutcome, GrantSpan},
	server::AuthorizationServer,
};

/// Handler for the `implicit` grant (`response_type=token`).
#[derive(Debug, Default)]
pub struct ImplicitGrant {
	access_token_ttl: Option<Duration>,
	metrics: Arc<GrantMetrics>,
}
impl ImplicitGrant {
	/// Identifier the handler is registered under.
	pub const IDENTIFIER: &'static str = GrantType::Implicit.as_str();

	/// Creates a handler that issues tokens with the server-wide default lifetime.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the access-token lifetime for tokens issued by this handler.
	pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
		self.set_access_token_ttl(ttl);

		self
	}

	/// Overrides the access-token lifetime in place.
	pub fn set_access_token_ttl(&mut self, ttl: Duration) {
		self.access_token_ttl = Some(ttl);
	}

	/// Shared completion counters; the handle stays valid after the handler is registered.
	pub fn metrics(&self) -> Arc<GrantMetrics> {
		self.metrics.clone()
	}

	async fn issue(&self, server: &AuthorizationServer, params: AuthParams) -> Result<TokenResponse> {
		let AuthParams { client_id, owner_id, scopes } = params;
		let key = SessionKey::user(client_id, owner_id);
		let access_token = server.secure_key.make()?;
		let ttl = self.access_token_ttl.unwrap_or_else(|| server.access_token_ttl());

		config::validate_ttl(ttl)?;

		let issued_at = OffsetDateTime::now_utc().unix_timestamp();
		let expires =
			issued_at.checked_add(ttl.whole_seconds()).ok_or(ConfigError::TtlOutOfRange)?;

		OffsetDateTime::from_unix_timestamp(expires).map_err(|_| ConfigError::TtlOutOfRange)?;

		if scopes.is_empty() {
			obs::empty_scope_request(&key);
		}

		let session_id = server.store.replace_session(&key).await?;

		obs::session_replaced(&key, session_id);

		let access_token_id =
			server.store.associate_access_token(session_id, &access_token, expires).await?;

		for scope in scopes.ids() {
			server.store.associate_scope(access_token_id, scope).await?;
		}

		obs::token_issued(
			session_id,
			access_token_id,
			&access_token.fingerprint(),
			expires - issued_at,
			scopes.len(),
		);

		Ok(TokenResponse::bearer(access_token, issued_at, expires))
	}
}
impl Grant for ImplicitGrant {
	fn identifier(&self) -> &str {
		Self::IDENTIFIER
	}

	fn response_type(&self) -> Option<ResponseType> {
		Some(ResponseType::Token)
	}

	fn access_token_ttl(&self) -> Option<Duration> {
		self.access_token_ttl
	}

	fn complete_flow<'a>(
		&'a self,
		server: &'a AuthorizationServer,
		params: AuthParams,
	) -> GrantFuture<'a> {
		Box::pin(async move {
			let span = GrantSpan::new(Self::IDENTIFIER, "complete_flow");

			obs::record_grant_outcome(Self::IDENTIFIER, GrantOutcome::Attempt);
			self.metrics.record_attempt();

			let result = span.instrument(self.issue(server, params)).await;

			match &result {
				Ok(_) => {
					obs::record_grant_outcome(Self::IDENTIFIER, GrantOutcome::Success);
					self.metrics.record_success();
				},
				Err(e) => {
					obs::grant_failed(e);
					obs::record_grant_outcome(Self::IDENTIFIER, GrantOutcome::Failure);
					self.metrics.record_failure();
				},
			}

			result
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{ClientId, OwnerId, RequestedScopes, TokenType},
		config::ServerConfig,
		store::{MemoryStore, SessionStore},
	};

	fn params(scopes: &str) -> AuthParams {
		AuthParams::new(
			ClientId::new("abc123").expect("Client fixture should be valid."),
			OwnerId::new("42").expect("Owner fixture should be valid."),
			RequestedScopes::from_str(scopes).expect("Scope fixture should be valid."),
		)
	}

	fn server(store: Arc<MemoryStore>) -> AuthorizationServer {
		AuthorizationServer::new(store, ServerConfig::default())
			.expect("Default config should be valid.")
	}

	#[test]
	fn contract_values() {
		let grant = ImplicitGrant::new();

		assert_eq!(grant.identifier(), "implicit");
		assert_eq!(grant.response_type(), Some(ResponseType::Token));
		assert_eq!(grant.access_token_ttl(), None);

		let mut grant = grant;

		grant.set_access_token_ttl(Duration::seconds(7_200));

		assert_eq!(grant.access_token_ttl(), Some(Duration::seconds(7_200)));
	}

	#[tokio::test]
	async fn issues_bearer_with_consistent_expiry() {
		let store = Arc::new(MemoryStore::default());
		let server = server(store.clone());
		let grant = ImplicitGrant::new();
		let before = OffsetDateTime::now_utc().unix_timestamp();
		let response = grant
			.complete_flow(&server, params("email profile"))
			.await
			.expect("Implicit grant should complete against the memory store.");
		let after = OffsetDateTime::now_utc().unix_timestamp();

		assert_eq!(response.token_type, TokenType::Bearer);
		assert_eq!(response.expires_in, 3_600);
		assert!(response.expires >= before + 3_600 && response.expires <= after + 3_600);

		let record = store
			.fetch_access_token(response.access_token.expose())
			.await
			.expect("Lookup should succeed.")
			.expect("Issued token should be stored.");

		assert_eq!(record.expires, response.expires);
		assert_eq!(grant.metrics().successes(), 1);
	}

	#[tokio::test]
	async fn rejects_unusable_overrides_before_touching_the_store() {
		let store = Arc::new(MemoryStore::default());
		let server = server(store.clone());

		for ttl in [Duration::ZERO, Duration::seconds(-5)] {
			let err = ImplicitGrant::new()
				.with_access_token_ttl(ttl)
				.complete_flow(&server, params("email"))
				.await
				.expect_err("Non-positive lifetimes must be rejected.");

			assert!(matches!(err, Error::Config(ConfigError::NonPositiveTtl)));
		}

		let grant = ImplicitGrant::new().with_access_token_ttl(Duration::seconds(i64::MAX));
		let err = grant
			.complete_flow(&server, params("email"))
			.await
			.expect_err("Overflowing lifetimes must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::TtlOutOfRange)));
		assert_eq!(grant.metrics().failures(), 1);
		assert_eq!(store.session_count(), 0);
	}
}
