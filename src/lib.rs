//! Implicit-grant token issuance core for OAuth 2.0 authorization servers: session replacement,
//! bearer minting, and scope association over pluggable, per-key serialized stores.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod grant;
pub mod obs;
pub mod server;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use tokio as _;
