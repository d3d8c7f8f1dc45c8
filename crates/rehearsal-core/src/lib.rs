//! Core types and pure domain logic for market rehearsal: audience sizing,
//! per-market persona resolution, four-pillar charts, and roster search.

pub mod citizen;
pub mod error;
pub mod market;
pub mod pillars;
pub mod presence;
pub mod resolve;
pub mod roster;
pub mod search;
pub mod targeting;
pub mod view;

pub use citizen::{BaziProfile, Citizen, CitizenId, MarketProfile, MarketProfiles};
pub use error::CoreError;
pub use market::{Market, MarketConfig};
pub use pillars::{ElementTheme, FourPillars, PillarChart, Provenance, synthesize};
pub use presence::is_meaningful;
pub use resolve::{ResolvedProfile, resolve};
pub use roster::{Roster, RosterPayload};
pub use search::{Page, SearchIndex};
pub use targeting::{
    AgeRange, Breakdown, Gender, TargetingConfig, TargetingSession, TargetingSubmission,
    TargetingWarning, estimate,
};
pub use view::{CitizenView, RosterState, RosterView};
