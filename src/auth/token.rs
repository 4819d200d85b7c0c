//! Access-token secrets, key sources, stored records, and wire responses.

pub mod key;
pub mod record;
pub mod response;
pub mod secret;
