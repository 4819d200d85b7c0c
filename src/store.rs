//! Storage contracts and built-in store implementations for sessions, tokens, and scopes.
//!
//! Every mutation of shared session state goes through [`SessionStore`], so ordering and locking
//! discipline lives in the store. The one sequence that needs it is replacing the session for a
//! key: [`SessionStore::replace_session`] ships with a delete-then-create default that is *not*
//! atomic. Two grant completions for the same key can interleave between the delete and the
//! create and leave two live sessions behind. Stores that can do better override it
//! ([`MemoryStore`], [`FileStore`]); stores that cannot are wrapped in [`KeyedStore`].

pub mod file;
pub mod keyed;
pub mod memory;

mod table;

pub use file::FileStore;
pub use keyed::KeyedStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{
		AccessTokenId, AccessTokenRecord, ScopeId, SessionId, SessionKey, SessionRecord,
		TokenSecret,
	},
};

/// Boxed future returned by every [`SessionStore`] operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract consumed by grant handlers.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Removes the session for `key` along with its tokens and scope associations.
	///
	/// Must succeed when no session exists.
	fn delete_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, ()>;

	/// Creates a new session for `key` and returns its identifier.
	fn create_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, SessionId>;

	/// Replaces whatever session exists for `key` with a new one.
	///
	/// The default runs [`delete_session`](Self::delete_session) and then
	/// [`create_session`](Self::create_session) as two separate calls, so concurrent callers for
	/// the same key may both observe an empty slot. Override it with an atomic implementation
	/// (row lock, compare-and-swap, or a single transaction) to keep one live session per key.
	fn replace_session<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, SessionId> {
		Box::pin(async move {
			self.delete_session(key).await?;
			self.create_session(key).await
		})
	}

	/// Persists an access token against a session and returns its identifier.
	fn associate_access_token<'a>(
		&'a self,
		session_id: SessionId,
		access_token: &'a TokenSecret,
		expires: i64,
	) -> StoreFuture<'a, AccessTokenId>;

	/// Associates a scope with an access token; repeating an identical call is a no-op.
	fn associate_scope<'a>(
		&'a self,
		access_token_id: AccessTokenId,
		scope: &'a ScopeId,
	) -> StoreFuture<'a, ()>;

	/// Looks up a stored row by its token value, expired or not.
	///
	/// Callers decide validity with [`AccessTokenRecord::status`].
	fn fetch_access_token<'a>(
		&'a self,
		access_token: &'a str,
	) -> StoreFuture<'a, Option<AccessTokenRecord>>;

	/// Lists every session stored for `key`.
	///
	/// Compliant stores return at most one row; more than one means the single-session invariant
	/// was broken by unserialized writers.
	fn fetch_sessions<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, Vec<SessionRecord>>;

	/// Lists the scopes associated with an access token in association order.
	fn access_token_scopes(&self, access_token_id: AccessTokenId) -> StoreFuture<'_, Vec<ScopeId>>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// A write referenced a row that does not exist.
	#[error("Constraint violation: {message}.")]
	Constraint {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_can_be_serialized() {
		let error = StoreError::Constraint { message: "session 4 is gone".into() };
		let payload = serde_json::to_string(&error).expect("StoreError should serialize to JSON.");
		let round_trip: StoreError =
			serde_json::from_str(&payload).expect("Serialized error should deserialize.");

		assert_eq!(round_trip, error);
		assert_eq!(error.to_string(), "Constraint violation: session 4 is gone.");
	}
}
