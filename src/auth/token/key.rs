//! Sources of unguessable access-token values.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, EntropyError},
};

/// Contract for producers of opaque bearer-token values.
///
/// Implementations must draw from a cryptographically secure source with at least 128 bits of
/// entropy per value and must fail rather than fall back to a weaker generator.
pub trait SecureKey
where
	Self: Send + Sync,
{
	/// Produces a fresh token value.
	fn make(&self) -> Result<TokenSecret, EntropyError>;
}

/// [`SecureKey`] backed by the operating system's random source.
///
/// Values are the base64url (no padding) encoding of `len` random bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OsSecureKey {
	len: usize,
}
impl OsSecureKey {
	/// Smallest accepted byte count (128 bits).
	pub const MIN_BYTES: usize = 16;
	/// Byte count used by [`Default`] (256 bits).
	pub const DEFAULT_BYTES: usize = 32;

	/// Creates a source drawing `len` random bytes per token.
	pub fn with_len(len: usize) -> Result<Self, ConfigError> {
		if len < Self::MIN_BYTES {
			return Err(ConfigError::InsufficientEntropy { bytes: len, min: Self::MIN_BYTES });
		}

		Ok(Self { len })
	}

	/// Number of random bytes drawn per token.
	pub fn byte_len(&self) -> usize {
		self.len
	}
}
impl Default for OsSecureKey {
	fn default() -> Self {
		Self { len: Self::DEFAULT_BYTES }
	}
}
impl SecureKey for OsSecureKey {
	fn make(&self) -> Result<TokenSecret, EntropyError> {
		let mut bytes = vec![0_u8; self.len];

		OsRng.try_fill_bytes(&mut bytes).map_err(EntropyError::new)?;

		Ok(TokenSecret::new(URL_SAFE_NO_PAD.encode(bytes)))
	}
}
