//! Issuer-level error types shared across grants, stores, and configuration.

// self
use crate::_prelude::*;

/// Issuer-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical issuer error exposed by public APIs.
///
/// Every variant is fatal for the flow that raised it; the issuer never retries on its own.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Secure random source could not produce a token.
	#[error(transparent)]
	Entropy(#[from] EntropyError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller handed over malformed request parameters.
	#[error(transparent)]
	Precondition(#[from] PreconditionError),

	/// No grant is registered under the requested identifier.
	#[error("No grant is registered for `{identifier}`.")]
	UnsupportedGrant {
		/// Grant identifier that failed to resolve.
		identifier: String,
	},
	/// No grant serves the requested `response_type`.
	#[error("No grant serves response type `{response_type}`.")]
	UnsupportedResponseType {
		/// Response type that failed to resolve.
		response_type: String,
	},
}
impl Error {
	/// Generic OAuth 2.0 error code safe to surface to the resource owner.
	///
	/// None of the failure detail (store messages, partially created ids, scopes) leaks through
	/// this mapping.
	pub fn oauth_error_code(&self) -> &'static str {
		match self {
			Error::Precondition(_) => "invalid_request",
			Error::UnsupportedGrant { .. } => "unsupported_grant_type",
			Error::UnsupportedResponseType { .. } => "unsupported_response_type",
			Error::Storage(_) | Error::Entropy(_) | Error::Config(_) => "server_error",
		}
	}
}

/// Failure reported by a [`SecureKey`](crate::auth::SecureKey) source.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Secure random source failed: {message}.")]
pub struct EntropyError {
	/// Human-readable error payload.
	pub message: String,
}
impl EntropyError {
	/// Wraps any displayable random-source failure.
	pub fn new(message: impl Display) -> Self {
		Self { message: message.to_string() }
	}
}

/// Configuration and validation failures raised by the issuer.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration document could not be parsed.
	#[error("Configuration is invalid at `{path}`.")]
	Parse {
		/// Dotted path to the offending field.
		path: String,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
	/// Access-token TTL must be strictly positive.
	#[error("The access token TTL must be positive.")]
	NonPositiveTtl,
	/// Access-token TTL pushes the expiry outside the representable range.
	#[error("The access token TTL exceeds the supported range.")]
	TtlOutOfRange,
	/// Token source would draw fewer random bytes than required.
	#[error("Token entropy of {bytes} bytes is below the {min} byte minimum.")]
	InsufficientEntropy {
		/// Configured byte count.
		bytes: usize,
		/// Minimum permitted byte count.
		min: usize,
	},
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Parse { path, source: e.into_inner() }
	}
}

/// Malformed request parameters rejected before any store call.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PreconditionError {
	/// Client, owner, or scope identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// Scope list could not be normalized.
	#[error(transparent)]
	Scope(#[from] crate::auth::ScopeValidationError),
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::{auth::ClientId, store::StoreError};

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("database unreachable"));

		let source = StdError::source(&error)
			.expect("Issuer error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn oauth_codes_hide_internal_detail() {
		let storage: Error = StoreError::Backend { message: "row 17 locked".into() }.into();
		let entropy: Error = EntropyError::new("getrandom unavailable").into();
		let precondition: Error = PreconditionError::from(
			ClientId::new("").expect_err("Empty client identifiers must be rejected."),
		)
		.into();
		let unsupported_grant = Error::UnsupportedGrant { identifier: "password".into() };
		let unsupported_response =
			Error::UnsupportedResponseType { response_type: "id_token".into() };

		assert_eq!(storage.oauth_error_code(), "server_error");
		assert_eq!(entropy.oauth_error_code(), "server_error");
		assert_eq!(precondition.oauth_error_code(), "invalid_request");
		assert_eq!(unsupported_grant.oauth_error_code(), "unsupported_grant_type");
		assert_eq!(unsupported_response.oauth_error_code(), "unsupported_response_type");
	}

	#[test]
	fn config_parse_error_keeps_path() {
		let mut de = serde_json::Deserializer::from_str(r#"{"nested":{"value":"x"}}"#);
		#[derive(Debug, Deserialize)]
		#[allow(dead_code)]
		struct Outer {
			nested: Inner,
		}
		#[derive(Debug, Deserialize)]
		#[allow(dead_code)]
		struct Inner {
			value: u32,
		}
		let err = serde_path_to_error::deserialize::<_, Outer>(&mut de)
			.expect_err("String value must not deserialize into u32.");
		let config_error = ConfigError::from(err);

		assert!(matches!(&config_error, ConfigError::Parse { path, .. } if path == "nested.value"));
	}
}
