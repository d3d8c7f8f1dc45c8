//! Roster loading: the live genesis endpoint first, then a static snapshot.

mod error;
mod snapshot;

#[cfg(feature = "http")]
pub mod http;

pub use error::RosterError;
pub use snapshot::{BUNDLED_SNAPSHOT, SnapshotSource};

#[cfg(feature = "http")]
pub use http::{RosterClient, RosterLoad, RosterOrigin};
