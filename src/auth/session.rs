//! Session keys and store-assigned row identifiers.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, OwnerId},
};

macro_rules! def_row_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(u64);
		impl $name {
			/// Wraps a raw store-assigned value.
			pub const fn new(value: u64) -> Self {
				Self(value)
			}

			/// Returns the raw store-assigned value.
			pub const fn get(self) -> u64 {
				self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "#{}"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				Display::fmt(&self.0, f)
			}
		}
	};
}

def_row_id! { SessionId, "Store-assigned identifier of a session row.", "Session" }
def_row_id! { AccessTokenId, "Store-assigned identifier of an access-token row.", "AccessToken" }

/// Kind of party owning a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
	/// An authenticated end user (implicit, authorization-code, password grants).
	User,
	/// The client itself (client-credentials grant).
	Client,
}
impl OwnerType {
	/// Returns the stable label stored alongside sessions.
	pub const fn as_str(self) -> &'static str {
		match self {
			OwnerType::User => "user",
			OwnerType::Client => "client",
		}
	}
}
impl Display for OwnerType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Identifies the single live session a client may hold for one owner.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
	/// Client the session was issued to.
	pub client: ClientId,
	/// Kind of owner.
	pub owner_type: OwnerType,
	/// Owner identifier.
	pub owner: OwnerId,
}
impl SessionKey {
	/// Builds the key for a user-owned session.
	pub fn user(client: ClientId, owner: OwnerId) -> Self {
		Self { client, owner_type: OwnerType::User, owner }
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}/{}", self.client, self.owner_type, self.owner)
	}
}

/// Persisted session row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
	/// Store-assigned identifier.
	pub id: SessionId,
	/// Key the session belongs to.
	pub key: SessionKey,
	/// Instant the store created the row.
	pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_keys_format_for_logs() {
		let key = SessionKey::user(
			ClientId::new("abc").expect("Client fixture should be valid."),
			OwnerId::new("42").expect("Owner fixture should be valid."),
		);

		assert_eq!(key.owner_type, OwnerType::User);
		assert_eq!(key.to_string(), "abc/user/42");
		assert_eq!(format!("{:?}", SessionId::new(7)), "Session#7");
	}

	#[test]
	fn row_ids_serialize_transparently() {
		let payload =
			serde_json::to_string(&AccessTokenId::new(9)).expect("Row id should serialize.");

		assert_eq!(payload, "9");
		assert_eq!(
			serde_json::to_string(&OwnerType::Client).expect("Owner type should serialize."),
			"\"client\""
		);
	}
}
