//! Server-wide issuance settings.

// self
use crate::{_prelude::*, auth::OsSecureKey, error::ConfigError};

/// Issuance settings shared by every grant handler on a server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
	/// Default access-token lifetime in seconds, used when a handler sets no override.
	pub access_token_ttl: i64,
	/// Random bytes drawn per access token by the default key source.
	pub token_bytes: usize,
}
impl ServerConfig {
	/// Default access-token lifetime (one hour).
	pub const DEFAULT_ACCESS_TOKEN_TTL: i64 = 3_600;

	/// Parses a JSON document, reporting the dotted path of any invalid field.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let config: Self = serde_path_to_error::deserialize(&mut de)?;

		config.validate()?;

		Ok(config)
	}

	/// Overrides the default access-token lifetime.
	pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
		self.access_token_ttl = ttl.whole_seconds();

		self
	}

	/// Overrides the number of random bytes per token.
	pub fn with_token_bytes(mut self, bytes: usize) -> Self {
		self.token_bytes = bytes;

		self
	}

	/// Default access-token lifetime as a [`Duration`].
	pub fn access_token_ttl(&self) -> Duration {
		Duration::seconds(self.access_token_ttl)
	}

	/// Checks the settings for values the issuer cannot honor.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_ttl(self.access_token_ttl())?;
		OsSecureKey::with_len(self.token_bytes)?;

		Ok(())
	}
}
impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			access_token_ttl: Self::DEFAULT_ACCESS_TOKEN_TTL,
			token_bytes: OsSecureKey::DEFAULT_BYTES,
		}
	}
}

/// Rejects lifetimes that would issue already-expired tokens.
pub(crate) fn validate_ttl(ttl: Duration) -> Result<(), ConfigError> {
	if ttl.whole_seconds() <= 0 {
		return Err(ConfigError::NonPositiveTtl);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_one_hour_and_256_bits() {
		let config = ServerConfig::default();

		assert_eq!(config.access_token_ttl(), Duration::hours(1));
		assert_eq!(config.token_bytes, 32);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn json_fills_missing_fields_with_defaults() {
		let config = ServerConfig::from_json_str(r#"{"access_token_ttl":7200}"#)
			.expect("Partial config should parse.");

		assert_eq!(config.access_token_ttl, 7_200);
		assert_eq!(config.token_bytes, OsSecureKey::DEFAULT_BYTES);
	}

	#[test]
	fn json_errors_name_the_field() {
		let err = ServerConfig::from_json_str(r#"{"access_token_ttl":"soon"}"#)
			.expect_err("String TTL must be rejected.");

		assert!(matches!(&err, ConfigError::Parse { path, .. } if path == "access_token_ttl"));
		assert!(ServerConfig::from_json_str(r#"{"refresh_token_ttl":60}"#).is_err());
	}

	#[test]
	fn validation_rejects_unusable_values() {
		assert!(matches!(
			ServerConfig::default().with_access_token_ttl(Duration::ZERO).validate(),
			Err(ConfigError::NonPositiveTtl)
		));
		assert!(matches!(
			ServerConfig::from_json_str(r#"{"token_bytes":8}"#),
			Err(ConfigError::InsufficientEntropy { bytes: 8, .. })
		));
	}
}
