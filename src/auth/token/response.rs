//! Token response returned to the authorization endpoint.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Token type advertised in issued responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
	/// RFC 6750 bearer token.
	#[default]
	Bearer,
}
impl TokenType {
	/// Returns the RFC 6749 `token_type` value.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenType::Bearer => "Bearer",
		}
	}
}
impl Display for TokenType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Successful grant result, serialized by the caller (usually into the redirect fragment).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Freshly minted access token.
	pub access_token: TokenSecret,
	/// Always [`TokenType::Bearer`].
	pub token_type: TokenType,
	/// Absolute expiry in Unix epoch seconds.
	pub expires: i64,
	/// Lifetime in seconds relative to issuance.
	pub expires_in: i64,
}
impl TokenResponse {
	/// Builds a bearer response issued at `issued_at` (epoch seconds).
	pub fn bearer(access_token: TokenSecret, issued_at: i64, expires: i64) -> Self {
		Self { access_token, token_type: TokenType::Bearer, expires, expires_in: expires - issued_at }
	}

	/// Key/value pairs in wire order, ready for form or fragment encoding.
	pub fn to_pairs(&self) -> [(&'static str, String); 4] {
		[
			("access_token", self.access_token.expose().to_owned()),
			("token_type", self.token_type.as_str().to_owned()),
			("expires", self.expires.to_string()),
			("expires_in", self.expires_in.to_string()),
		]
	}
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires", &self.expires)
			.field("expires_in", &self.expires_in)
			.finish()
	}
}
