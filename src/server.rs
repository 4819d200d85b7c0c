//! Authorization-server context handed to grant handlers, with identifier-keyed dispatch.

// self
use crate::{
	_prelude::*,
	auth::{OsSecureKey, SecureKey, TokenResponse},
	config::ServerConfig,
	error::ConfigError,
	grant::{AuthParams, Grant, ResponseType},
	store::SessionStore,
};

/// Collaborators and settings shared by every grant handler.
///
/// Handlers receive the server by reference on each [`Grant::complete_flow`] call instead of
/// holding a back-reference, so the registry can own the handlers without cycles.
pub struct AuthorizationServer {
	/// Session store used for every mutation.
	pub store: Arc<dyn SessionStore>,
	/// Source of access-token values.
	pub secure_key: Arc<dyn SecureKey>,
	/// Server-wide issuance settings.
	pub config: ServerConfig,
	grants: BTreeMap<String, Arc<dyn Grant>>,
}
impl AuthorizationServer {
	/// Creates a server backed by `store`, minting tokens from the OS random source.
	pub fn new(store: Arc<dyn SessionStore>, config: ServerConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		let secure_key = Arc::new(OsSecureKey::with_len(config.token_bytes)?);

		Ok(Self { store, secure_key, config, grants: BTreeMap::new() })
	}

	/// Replaces the token source.
	pub fn with_secure_key(mut self, secure_key: Arc<dyn SecureKey>) -> Self {
		self.secure_key = secure_key;

		self
	}

	/// Registers a grant handler; a handler with the same identifier is replaced.
	pub fn with_grant(mut self, grant: impl 'static + Grant) -> Self {
		self.register_grant(Arc::new(grant));

		self
	}

	/// Registers a shared grant handler and returns the one it displaced, if any.
	pub fn register_grant(&mut self, grant: Arc<dyn Grant>) -> Option<Arc<dyn Grant>> {
		self.grants.insert(grant.identifier().to_owned(), grant)
	}

	/// Looks up a handler by grant identifier.
	pub fn grant(&self, identifier: &str) -> Option<&Arc<dyn Grant>> {
		self.grants.get(identifier)
	}

	/// Looks up the handler serving `response_type` at the authorization endpoint.
	///
	/// When several handlers share a response type, the one with the lowest identifier wins.
	pub fn grant_for_response_type(&self, response_type: ResponseType) -> Option<&Arc<dyn Grant>> {
		self.grants.values().find(|grant| grant.response_type() == Some(response_type))
	}

	/// Identifiers of every registered grant, sorted.
	pub fn grant_identifiers(&self) -> impl Iterator<Item = &str> {
		self.grants.keys().map(String::as_str)
	}

	/// Server-wide default access-token lifetime.
	pub fn access_token_ttl(&self) -> Duration {
		self.config.access_token_ttl()
	}

	/// Dispatches to the grant registered under `identifier`.
	pub async fn complete_flow(&self, identifier: &str, params: AuthParams) -> Result<TokenResponse> {
		let grant = self
			.grant(identifier)
			.ok_or_else(|| Error::UnsupportedGrant { identifier: identifier.to_owned() })?;

		grant.complete_flow(self, params).await
	}

	/// Dispatches an authorization-endpoint request by its `response_type`.
	pub async fn authorize(
		&self,
		response_type: ResponseType,
		params: AuthParams,
	) -> Result<TokenResponse> {
		let grant = self.grant_for_response_type(response_type).ok_or_else(|| {
			Error::UnsupportedResponseType { response_type: response_type.as_str().to_owned() }
		})?;

		grant.complete_flow(self, params).await
	}
}
impl Debug for AuthorizationServer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationServer")
			.field("config", &self.config)
			.field("grants", &self.grants.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{ClientId, OwnerId, RequestedScopes},
		grant::{GrantType, ImplicitGrant},
		store::MemoryStore,
	};

	fn server() -> AuthorizationServer {
		AuthorizationServer::new(Arc::new(MemoryStore::default()), ServerConfig::default())
			.expect("Default config should be valid.")
	}

	fn params() -> AuthParams {
		AuthParams::new(
			ClientId::new("abc123").expect("Client fixture should be valid."),
			OwnerId::new("42").expect("Owner fixture should be valid."),
			RequestedScopes::parse(["email"]).expect("Scope fixture should be valid."),
		)
	}

	#[test]
	fn rejects_invalid_config() {
		let err = AuthorizationServer::new(
			Arc::new(MemoryStore::default()),
			ServerConfig::default().with_token_bytes(4),
		)
		.expect_err("Four-byte tokens must be rejected.");

		assert!(matches!(err, ConfigError::InsufficientEntropy { bytes: 4, .. }));
	}

	#[test]
	fn registry_replaces_same_identifier() {
		let mut server = server().with_grant(ImplicitGrant::new());
		let displaced = server.register_grant(Arc::new(
			ImplicitGrant::new().with_access_token_ttl(Duration::seconds(60)),
		));

		assert!(displaced.is_some());
		assert_eq!(
			server.grant_identifiers().collect::<Vec<_>>(),
			vec![GrantType::Implicit.as_str()]
		);
		assert_eq!(
			server.grant("implicit").and_then(|grant| grant.access_token_ttl()),
			Some(Duration::seconds(60))
		);
		assert!(server.grant_for_response_type(ResponseType::Token).is_some());
		assert!(server.grant_for_response_type(ResponseType::Code).is_none());
	}

	#[tokio::test]
	async fn unknown_identifiers_are_unsupported() {
		let server = server().with_grant(ImplicitGrant::new());
		let err = server
			.complete_flow("password", params())
			.await
			.expect_err("Unregistered grants must not dispatch.");

		assert!(matches!(
			err,
			Error::UnsupportedGrant { ref identifier } if identifier == "password"
		));
		assert_eq!(err.oauth_error_code(), "unsupported_grant_type");

		let err = server
			.authorize(ResponseType::Code, params())
			.await
			.expect_err("No handler serves the code response type.");

		assert!(matches!(
			err,
			Error::UnsupportedResponseType { ref response_type } if response_type == "code"
		));
		assert_eq!(err.oauth_error_code(), "unsupported_response_type");
	}
}
