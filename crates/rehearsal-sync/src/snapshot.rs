//! Static roster snapshots used when the live endpoint is unreachable.

use std::fmt;
use std::path::PathBuf;

use rehearsal_core::Roster;
use tracing::info;

use crate::error::RosterError;

/// Snapshot compiled into the binary. Always available as a last resort.
pub const BUNDLED_SNAPSHOT: &str = include_str!("../data/citizens.json");

/// Where the fallback roster comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SnapshotSource {
    #[default]
    Bundled,
    File(PathBuf),
    /// A served `citizens.json`, e.g. `http://localhost:3000/citizens.json`.
    Url(String),
}

impl SnapshotSource {
    /// Interpret a configured value: `http(s)://` prefixes are URLs, anything
    /// else is a file path, and no value means the bundled snapshot.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => SnapshotSource::Bundled,
            Some(v) if v.starts_with("http://") || v.starts_with("https://") => {
                SnapshotSource::Url(v.to_string())
            }
            Some(v) => SnapshotSource::File(PathBuf::from(v)),
        }
    }

    /// Load a bundled or file snapshot. URL snapshots go through the HTTP client.
    pub async fn load_local(&self) -> Result<Roster, RosterError> {
        let roster = match self {
            SnapshotSource::Bundled => Roster::from_json(BUNDLED_SNAPSHOT)?,
            SnapshotSource::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                Roster::from_slice(&bytes)?
            }
            SnapshotSource::Url(url) => return Err(RosterError::UrlUnsupported(url.clone())),
        };
        info!(source = %self, count = roster.citizens.len(), total = roster.total, "loaded roster snapshot");
        Ok(roster)
    }
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::Bundled => f.write_str("bundled snapshot"),
            SnapshotSource::File(path) => write!(f, "{}", path.display()),
            SnapshotSource::Url(url) => f.write_str(url),
        }
    }
}
