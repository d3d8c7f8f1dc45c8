//! Roster payload decoding.
//!
//! The genesis endpoint has returned both a bare citizen array and a
//! `{citizens, total}` envelope. Both shapes are decoded here into a single
//! [`Roster`]; nothing downstream branches on the wire shape.

use serde::Deserialize;

use crate::citizen::Citizen;
use crate::error::CoreError;

/// Either wire shape of a roster response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RosterPayload {
    List(Vec<Citizen>),
    Envelope {
        citizens: Vec<Citizen>,
        #[serde(default)]
        total: Option<u64>,
    },
}

/// A loaded roster.
///
/// `total` is the server-reported population size. It is independent of
/// `citizens.len()` and is never reconciled with it.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub citizens: Vec<Citizen>,
    pub total: u64,
}

impl From<RosterPayload> for Roster {
    fn from(payload: RosterPayload) -> Self {
        match payload {
            RosterPayload::List(citizens) => Self {
                total: citizens.len() as u64,
                citizens,
            },
            RosterPayload::Envelope { citizens, total } => Self {
                total: total.unwrap_or(citizens.len() as u64),
                citizens,
            },
        }
    }
}

impl Roster {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let payload: RosterPayload = serde_json::from_str(json)?;
        Ok(payload.into())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let payload: RosterPayload = serde_json::from_slice(bytes)?;
        Ok(payload.into())
    }

    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }

    /// Look up a citizen by its stringified id.
    pub fn find(&self, id: &str) -> Option<&Citizen> {
        let id = id.trim();
        self.citizens.iter().find(|c| c.id.to_string() == id)
    }
}
