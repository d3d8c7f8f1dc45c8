//! Case-insensitive roster search and pagination.
//!
//! A citizen matches when the query is a substring of any of: root name,
//! the `TW`/`US`/`CN` overlay names (regardless of the selected market),
//! the stringified id, the chart structure in either language, or the first
//! trait of the `US` overlay or the root record. Filtering is recomputed in
//! full for every query and preserves roster order.

use std::borrow::Cow;

use crate::citizen::Citizen;
use crate::market::Market;

/// Citizens shown per page.
pub const PAGE_SIZE: usize = 20;

/// Lowercased search text for each citizen, reusable across queries.
pub struct SearchIndex<'a> {
    entries: Vec<(&'a Citizen, Vec<String>)>,
}

impl<'a> SearchIndex<'a> {
    pub fn new(citizens: &'a [Citizen]) -> Self {
        let entries = citizens
            .iter()
            .map(|c| {
                let fields = searchable_fields(c)
                    .into_iter()
                    .map(|f| f.to_lowercase())
                    .collect();
                (c, fields)
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All citizens matching `query`, in roster order. A blank query matches everyone.
    pub fn filter(&self, query: &str) -> Vec<&'a Citizen> {
        self.positions(query)
            .into_iter()
            .map(|i| self.entries[i].0)
            .collect()
    }

    /// Roster positions of the citizens matching `query`, ascending.
    pub fn positions(&self, query: &str) -> Vec<usize> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (_, fields))| {
                needle.is_empty() || fields.iter().any(|f| f.contains(&needle))
            })
            .map(|(i, _)| i)
            .collect()
    }
}

/// Whether a single citizen matches `query`.
pub fn matches(citizen: &Citizen, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || searchable_fields(citizen)
            .iter()
            .any(|f| f.to_lowercase().contains(&needle))
}

fn searchable_fields(citizen: &Citizen) -> Vec<Cow<'_, str>> {
    let mut fields: Vec<Cow<'_, str>> = Vec::with_capacity(8);
    if let Some(name) = citizen.name.as_deref() {
        fields.push(Cow::Borrowed(name));
    }
    for market in Market::ALL {
        if let Some(name) = citizen.profiles.get(market).and_then(|p| p.name.as_deref()) {
            fields.push(Cow::Borrowed(name));
        }
    }
    fields.push(Cow::Owned(citizen.id.to_string()));

    let bazi = &citizen.bazi_profile;
    fields.extend(bazi.structure.as_deref().map(Cow::Borrowed));
    fields.extend(bazi.structure_en.as_deref().map(Cow::Borrowed));

    let us_trait = citizen
        .profiles
        .get(Market::Us)
        .and_then(|p| p.traits.first());
    fields.extend(us_trait.map(|t| Cow::Borrowed(t.as_str())));
    fields.extend(citizen.traits.first().map(|t| Cow::Borrowed(t.as_str())));
    fields
}

// ── Pagination ──

/// One page of a filtered sequence. `number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.number > 1
    }
}

/// Number of pages needed for `len` items; at least one.
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Slice page `number` (1-based) out of `items`. Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], number: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let number = number.max(1);
    let start = (number - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        number,
        total_pages: page_count(items.len(), page_size),
        total_matches: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citizen::{BaziProfile, CitizenId, MarketProfile};

    fn citizen(id: u64, name: &str) -> Citizen {
        Citizen {
            id: CitizenId::Number(id),
            name: Some(name.into()),
            age: None,
            gender: None,
            location: None,
            occupation: None,
            traits: Vec::new(),
            profiles: Default::default(),
            bazi_profile: BaziProfile::default(),
        }
    }

    fn roster() -> Vec<Citizen> {
        let mut a = citizen(101, "王小明");
        a.profiles.cn = Some(MarketProfile {
            name: Some("王經銷".into()),
            ..Default::default()
        });
        a.profiles.us = Some(MarketProfile {
            name: Some("Tom Wang".into()),
            traits: vec!["Ambitious".into()],
            ..Default::default()
        });
        let mut b = citizen(202, "Alice Wu");
        b.bazi_profile.structure = Some("食神格".into());
        b.bazi_profile.structure_en = Some("Eating God".into());
        let mut c = citizen(303, "李佳");
        c.traits = vec!["Cautious".into(), "Curious".into()];
        vec![a, b, c]
    }

    fn ids(found: &[&Citizen]) -> Vec<String> {
        found.iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn empty_query_matches_everyone_in_order() {
        let citizens = roster();
        let index = SearchIndex::new(&citizens);
        assert_eq!(ids(&index.filter("")), ["101", "202", "303"]);
        assert_eq!(ids(&index.filter("   ")), ["101", "202", "303"]);
    }

    #[test]
    fn matches_overlay_names_in_any_market() {
        let citizens = roster();
        let index = SearchIndex::new(&citizens);
        assert_eq!(ids(&index.filter("經銷")), ["101"]);
        assert_eq!(ids(&index.filter("tom")), ["101"]);
    }

    #[test]
    fn matches_id_structure_and_first_traits() {
        let citizens = roster();
        let index = SearchIndex::new(&citizens);
        assert_eq!(ids(&index.filter("20")), ["202"]);
        assert_eq!(ids(&index.filter("食神")), ["202"]);
        assert_eq!(ids(&index.filter("EATING")), ["202"]);
        assert_eq!(ids(&index.filter("ambitious")), ["101"]);
        assert_eq!(ids(&index.filter("cautious")), ["303"]);
        // Only the first trait is searchable.
        assert!(index.filter("curious").is_empty());
    }

    #[test]
    fn single_citizen_match_agrees_with_index() {
        let citizens = roster();
        let index = SearchIndex::new(&citizens);
        for query in ["", "alice", "經銷", "303", "nobody"] {
            let expected: Vec<&Citizen> = citizens.iter().filter(|c| matches(c, query)).collect();
            assert_eq!(ids(&index.filter(query)), ids(&expected), "query {query:?}");
        }
    }

    #[test]
    fn positions_follow_roster_order() {
        let citizens = roster();
        let index = SearchIndex::new(&citizens);
        assert_eq!(index.positions(""), [0, 1, 2]);
        assert_eq!(index.positions("wu"), [1]);
        assert!(index.positions("nobody").is_empty());
    }

    #[test]
    fn paginate_slices_fixed_pages() {
        let items: Vec<u32> = (1..=45).collect();
        let first = paginate(&items, 1, PAGE_SIZE);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next() && !first.has_prev());

        let last = paginate(&items, 3, PAGE_SIZE);
        assert_eq!(last.items, (41..=45).collect::<Vec<_>>());
        assert!(!last.has_next() && last.has_prev());

        let past = paginate(&items, 9, PAGE_SIZE);
        assert!(past.items.is_empty());
        assert_eq!(past.total_matches, 45);
    }

    #[test]
    fn empty_sequence_has_one_empty_page() {
        let page = paginate::<u32>(&[], 1, PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(paginate::<u32>(&[], 0, PAGE_SIZE).number, 1);
    }
}
