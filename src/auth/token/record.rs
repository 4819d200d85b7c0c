//! Persisted access-token rows and their lifecycle helpers.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenId, SessionId, TokenSecret},
};

/// Current lifecycle status for an access-token row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is currently valid.
	Active,
	/// Token reached its expiry instant.
	Expired,
}

/// Access token as stored against its session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenRecord {
	/// Store-assigned identifier.
	pub id: AccessTokenId,
	/// Session the token belongs to.
	pub session_id: SessionId,
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Absolute expiry in Unix epoch seconds.
	pub expires: i64,
}
impl AccessTokenRecord {
	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant.unix_timestamp() >= self.expires {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token is valid at the provided instant.
	pub fn is_active_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Active)
	}

	/// Returns `true` if the token is currently valid.
	pub fn is_active(&self) -> bool {
		matches!(self.status(), TokenStatus::Active)
	}

	/// Expiry as a timestamp; `None` when the stored value is outside the supported range.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		OffsetDateTime::from_unix_timestamp(self.expires).ok()
	}
}
impl Debug for AccessTokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessTokenRecord")
			.field("id", &self.id)
			.field("session_id", &self.session_id)
			.field("access_token", &"<redacted>")
			.field("expires", &self.expires)
			.finish()
	}
}
