//! Grant contract shared by every OAuth 2.0 grant variant, plus the implicit grant handler.
//!
//! An authorization server selects a handler by [`Grant::identifier`] (or by
//! [`Grant::response_type`] at the authorization endpoint) through
//! [`AuthorizationServer`](crate::server::AuthorizationServer)'s registry, so dispatch never
//! inspects concrete handler types.

pub mod implicit;
mod metrics;

pub use implicit::*;
pub use metrics::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, OwnerId, RequestedScopes, ScopeDescriptor, TokenResponse},
	error::PreconditionError,
	server::AuthorizationServer,
};

/// Boxed future returned by [`Grant::complete_flow`].
pub type GrantFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenResponse>> + 'a + Send>>;

/// Contract implemented by grant handlers registered on an authorization server.
pub trait Grant
where
	Self: Send + Sync,
{
	/// Stable identifier the server dispatches on (e.g. `implicit`).
	fn identifier(&self) -> &str;

	/// How the authorization endpoint delivers the result, if the grant runs there at all.
	fn response_type(&self) -> Option<ResponseType>;

	/// Handler-level access-token lifetime override.
	fn access_token_ttl(&self) -> Option<Duration>;

	/// Completes the grant for an already-authenticated owner and already-validated scopes.
	///
	/// The server is passed per call so handlers never hold on to shared state.
	fn complete_flow<'a>(
		&'a self,
		server: &'a AuthorizationServer,
		params: AuthParams,
	) -> GrantFuture<'a>;
}

/// Well-known RFC 6749 grant identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Implicit grant for public browser clients.
	Implicit,
	/// Authorization Code grant.
	AuthorizationCode,
	/// Client Credentials grant for app-only tokens.
	ClientCredentials,
	/// Resource Owner Password Credentials grant.
	Password,
	/// Refresh Token grant.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::Implicit => "implicit",
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Password => "password",
			GrantType::RefreshToken => "refresh_token",
		}
	}

	/// Response type used at the authorization endpoint, if any.
	pub const fn response_type(self) -> Option<ResponseType> {
		match self {
			GrantType::Implicit => Some(ResponseType::Token),
			GrantType::AuthorizationCode => Some(ResponseType::Code),
			GrantType::ClientCredentials | GrantType::Password | GrantType::RefreshToken => None,
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// `response_type` values understood by the authorization endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
	/// Token delivered directly in the redirect fragment.
	Token,
	/// Authorization code delivered in the redirect query.
	Code,
}
impl ResponseType {
	/// Returns the RFC 6749 `response_type` value.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResponseType::Token => "token",
			ResponseType::Code => "code",
		}
	}
}
impl Display for ResponseType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ResponseType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"token" => Ok(ResponseType::Token),
			"code" => Ok(ResponseType::Code),
			other => Err(Error::UnsupportedResponseType { response_type: other.to_owned() }),
		}
	}
}

/// Request parameters the caller assembles after authenticating the owner and validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParams {
	/// Registered client the token is issued to.
	pub client_id: ClientId,
	/// Authenticated resource owner.
	pub owner_id: OwnerId,
	/// Requested scopes, already checked against the client's allowed set.
	pub scopes: RequestedScopes,
}
impl AuthParams {
	/// Assembles parameters from validated parts.
	pub fn new(client_id: ClientId, owner_id: OwnerId, scopes: RequestedScopes) -> Self {
		Self { client_id, owner_id, scopes }
	}

	/// Validates raw identifiers and builds the parameters.
	///
	/// Empty or whitespace-bearing identifiers are rejected here, before any store is touched.
	pub fn parse<I>(
		client_id: &str,
		owner_id: &str,
		scopes: I,
	) -> Result<Self, PreconditionError>
	where
		I: IntoIterator<Item = ScopeDescriptor>,
	{
		Ok(Self {
			client_id: ClientId::new(client_id)?,
			owner_id: OwnerId::new(owner_id)?,
			scopes: RequestedScopes::new(scopes),
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{IdentifierError, ScopeId};

	#[test]
	fn grant_types_map_to_response_types() {
		assert_eq!(GrantType::Implicit.as_str(), "implicit");
		assert_eq!(GrantType::Implicit.response_type(), Some(ResponseType::Token));
		assert_eq!(GrantType::AuthorizationCode.response_type(), Some(ResponseType::Code));
		assert_eq!(GrantType::ClientCredentials.response_type(), None);
		assert_eq!(ResponseType::from_str("token").expect("`token` should parse."), ResponseType::Token);
		assert!(matches!(
			ResponseType::from_str("id_token"),
			Err(Error::UnsupportedResponseType { response_type }) if response_type == "id_token"
		));
	}

	#[test]
	fn auth_params_reject_empty_identifiers() {
		let scopes = [ScopeDescriptor::new(ScopeId::new("email").expect("Scope should be valid."))];

		assert_eq!(
			AuthParams::parse("", "42", scopes.clone()),
			Err(PreconditionError::Identifier(IdentifierError::Empty { kind: "Client" }))
		);
		assert!(AuthParams::parse("abc123", " ", scopes.clone()).is_err());

		let params = AuthParams::parse("abc123", "42", scopes).expect("Valid parameters should parse.");

		assert_eq!(params.client_id.as_ref(), "abc123");
		assert_eq!(params.scopes.len(), 1);
	}

	#[test]
	fn auth_params_deserialize_from_descriptor_json() {
		let params: AuthParams = serde_json::from_str(
			r#"{"client_id":"abc","owner_id":"42","scopes":[{"id":"a"},{"id":"a"},{"id":"b"}]}"#,
		)
		.expect("Parameters should deserialize.");

		assert_eq!(params.scopes.normalized(), "a b");
		assert!(
			serde_json::from_str::<AuthParams>(r#"{"client_id":"","owner_id":"42","scopes":[]}"#)
				.is_err()
		);
	}
}
