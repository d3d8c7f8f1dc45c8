//! HTTP roster client for the simulation backend's genesis endpoint.
//!
//! [`RosterClient::load`] tries `GET {api_base}/citizens/genesis` and, on any
//! transport error, non-success status, or undecodable body, degrades to the
//! configured snapshot. Only when both fail is an error returned.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rehearsal_core::Roster;
use tracing::{info, warn};

use crate::error::RosterError;
use crate::snapshot::SnapshotSource;

/// Path of the live roster endpoint, relative to the API base.
pub const GENESIS_PATH: &str = "/citizens/genesis";

/// Which source a roster was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterOrigin {
    Live,
    Snapshot(SnapshotSource),
}

/// A roster together with where and when it was loaded.
#[derive(Debug, Clone)]
pub struct RosterLoad {
    pub roster: Roster,
    pub origin: RosterOrigin,
    pub loaded_at: DateTime<Utc>,
}

/// HTTP client for the citizen roster.
pub struct RosterClient {
    client: reqwest::Client,
    api_base: String,
    snapshot: SnapshotSource,
}

impl RosterClient {
    /// Create a client for the given API base URL with the bundled snapshot as fallback.
    ///
    /// `api_base` should be like `http://localhost:8000` (no trailing slash).
    pub fn new(api_base: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_base)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(api_base: String, timeout: Duration) -> Result<Self, RosterError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_base))
    }

    fn with_client(client: reqwest::Client, api_base: String) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            snapshot: SnapshotSource::Bundled,
        }
    }

    /// Use `snapshot` as the fallback source.
    pub fn with_snapshot(mut self, snapshot: SnapshotSource) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn snapshot(&self) -> &SnapshotSource {
        &self.snapshot
    }

    /// Fetch the roster from the live endpoint.
    pub async fn fetch_live(&self) -> Result<Roster, RosterError> {
        let url = format!("{}{}", self.api_base, GENESIS_PATH);
        self.get_roster(&url).await
    }

    /// Load the fallback snapshot.
    pub async fn fetch_snapshot(&self) -> Result<Roster, RosterError> {
        match &self.snapshot {
            SnapshotSource::Url(url) => self.get_roster(url).await,
            local => local.load_local().await,
        }
    }

    /// Load the roster, degrading from the live endpoint to the snapshot.
    pub async fn load(&self) -> Result<RosterLoad, RosterError> {
        let live_err = match self.fetch_live().await {
            Ok(roster) => {
                return Ok(RosterLoad {
                    roster,
                    origin: RosterOrigin::Live,
                    loaded_at: Utc::now(),
                });
            }
            Err(e) => e,
        };

        warn!(
            error = %live_err,
            fallback = %self.snapshot,
            "live roster unavailable, falling back to snapshot"
        );

        match self.fetch_snapshot().await {
            Ok(roster) => Ok(RosterLoad {
                roster,
                origin: RosterOrigin::Snapshot(self.snapshot.clone()),
                loaded_at: Utc::now(),
            }),
            Err(fallback_err) => {
                warn!(error = %fallback_err, "roster snapshot unavailable");
                Err(RosterError::Unavailable {
                    live: live_err.to_string(),
                    fallback: fallback_err.to_string(),
                })
            }
        }
    }

    async fn get_roster(&self, url: &str) -> Result<Roster, RosterError> {
        info!(url = %url, "fetching citizen roster");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RosterError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let roster = Roster::from_slice(&bytes)?;
        info!(count = roster.citizens.len(), total = roster.total, "fetched citizen roster");
        Ok(roster)
    }
}
