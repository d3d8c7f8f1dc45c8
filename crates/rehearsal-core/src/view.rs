//! Derived views over citizens and the roster browsing state.
//!
//! [`CitizenView`] is built fresh per render from a borrowed citizen; the
//! citizen itself is never modified. [`RosterView`] carries the selected
//! market explicitly so resolution and search stay pure.

use rand::Rng;

use crate::citizen::Citizen;
use crate::market::Market;
use crate::pillars::{PillarChart, synthesize};
use crate::resolve::{
    ResolvedProfile, avatar_seed, resolve, resolve_life_state, resolve_structure, resolve_traits,
};
use crate::roster::Roster;
use crate::search::{PAGE_SIZE, Page, SearchIndex, page_count, paginate};

/// Number of avatar variants a seed is folded into.
pub const AVATAR_VARIANTS: u64 = 16;

/// Everything needed to present one citizen in one market.
#[derive(Debug, Clone)]
pub struct CitizenView<'a> {
    pub citizen: &'a Citizen,
    pub market: Market,
    pub profile: ResolvedProfile,
    pub traits: &'a [String],
    pub life_state: Option<&'a str>,
    pub structure: Option<&'a str>,
    pub chart: PillarChart,
    pub birth: Option<String>,
    pub avatar: u64,
}

impl<'a> CitizenView<'a> {
    pub fn build<R: Rng + ?Sized>(citizen: &'a Citizen, market: Market, rng: &mut R) -> Self {
        let bazi = &citizen.bazi_profile;
        Self {
            citizen,
            market,
            profile: resolve(citizen, market),
            traits: resolve_traits(citizen, market),
            life_state: resolve_life_state(bazi, market),
            structure: resolve_structure(bazi, market),
            chart: synthesize(bazi, market, rng),
            birth: bazi.birth_line(),
            avatar: avatar_seed(&citizen.id) % AVATAR_VARIANTS,
        }
    }
}

// ── Roster browsing ──

/// Load state of the roster. `Failed` is an explicit terminal state, never
/// an endless `Loading`.
#[derive(Debug, Clone)]
pub enum RosterState {
    Loading,
    Ready(Roster),
    Failed(String),
}

/// Browsing state for the population view: roster, selected market, applied
/// query, and current page.
///
/// Matches are recomputed only when the roster or the applied query changes.
#[derive(Debug, Clone)]
pub struct RosterView {
    state: RosterState,
    market: Market,
    query: String,
    page: usize,
    /// Roster positions matching `query`.
    matched: Vec<usize>,
}

impl RosterView {
    pub fn new(market: Market) -> Self {
        Self {
            state: RosterState::Loading,
            market,
            query: String::new(),
            page: 1,
            matched: Vec::new(),
        }
    }

    pub fn load(&mut self, roster: Roster) {
        self.state = RosterState::Ready(roster);
        self.page = 1;
        self.refresh_matches();
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.state = RosterState::Failed(reason.into());
        self.matched.clear();
    }

    pub fn state(&self) -> &RosterState {
        &self.state
    }

    pub fn roster(&self) -> Option<&Roster> {
        match &self.state {
            RosterState::Ready(roster) => Some(roster),
            _ => None,
        }
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Apply a new query. A changed query returns to page 1.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.page = 1;
            self.refresh_matches();
        }
    }

    fn refresh_matches(&mut self) {
        self.matched = match &self.state {
            RosterState::Ready(roster) => SearchIndex::new(&roster.citizens).positions(&self.query),
            _ => Vec::new(),
        };
    }

    /// Select a market. A changed market returns to page 1.
    pub fn set_market(&mut self, market: Market) {
        if market != self.market {
            self.market = market;
            self.page = 1;
        }
    }

    /// Jump to a page, clamped to the pages the current query produces.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    /// Server-reported population size, independent of what is shown.
    pub fn reported_total(&self) -> Option<u64> {
        self.roster().map(|r| r.total)
    }

    /// Citizens matching the applied query, in roster order.
    pub fn matches(&self) -> Vec<&Citizen> {
        match self.roster() {
            Some(roster) => self.matched.iter().map(|&i| &roster.citizens[i]).collect(),
            None => Vec::new(),
        }
    }

    pub fn total_pages(&self) -> usize {
        page_count(self.matched.len(), PAGE_SIZE)
    }

    /// Current page of matches, or `None` unless the roster is ready.
    pub fn page(&self) -> Option<Page<&Citizen>> {
        self.roster()?;
        Some(paginate(&self.matches(), self.page, PAGE_SIZE))
    }

    /// Current page resolved for the selected market.
    pub fn page_views<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Page<CitizenView<'_>>> {
        let page = self.page()?;
        Some(Page {
            items: page
                .items
                .into_iter()
                .map(|c| CitizenView::build(c, self.market, &mut *rng))
                .collect(),
            number: page.number,
            total_pages: page.total_pages,
            total_matches: page.total_matches,
        })
    }
}
