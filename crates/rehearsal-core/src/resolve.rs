//! Per-market display resolution for citizen records.
//!
//! Each field resolves independently through the same precedence:
//!
//! 1. the selected market's overlay, if meaningful
//! 2. the `TW` overlay, if meaningful
//! 3. the citizen's root field, if meaningful
//! 4. [`UNKNOWN`]
//!
//! Pain points have no root value: they stop after step 2 and stay absent.
//! Resolution is pure; the same inputs always produce the same profile.

use serde::Serialize;

use crate::citizen::{BaziProfile, Citizen, CitizenId, MarketProfile};
use crate::market::Market;
use crate::presence::meaningful;

/// Display value when no source supplies a field.
pub const UNKNOWN: &str = "Unknown";

/// Market whose overlay backs every other market.
pub const FALLBACK_MARKET: Market = Market::Tw;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProfile {
    pub name: String,
    pub city: String,
    pub job: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain: Option<String>,
}

/// Resolve the display profile for `citizen` in `market`.
pub fn resolve(citizen: &Citizen, market: Market) -> ResolvedProfile {
    let name = overlay(citizen, market, |p| p.name.as_deref());
    let city = overlay(citizen, market, |p| p.city.as_deref());
    let job = overlay(citizen, market, |p| p.job.as_deref());
    let pain = overlay(citizen, market, |p| p.pain.as_deref());

    ResolvedProfile {
        name: or_root(name, citizen.name.as_deref()),
        city: or_root(city, citizen.location.as_deref()),
        job: or_root(job, citizen.occupation.as_deref()),
        pain: pain.map(str::to_string),
    }
}

/// Markets consulted for overlay values, in precedence order.
fn precedence(market: Market) -> impl Iterator<Item = Market> {
    std::iter::once(market).chain((market != FALLBACK_MARKET).then_some(FALLBACK_MARKET))
}

fn overlay<'a, F>(citizen: &'a Citizen, market: Market, field: F) -> Option<&'a str>
where
    F: Fn(&'a MarketProfile) -> Option<&'a str>,
{
    precedence(market)
        .filter_map(|m| citizen.profiles.get(m))
        .find_map(|profile| meaningful(field(profile)))
}

fn or_root(overlay: Option<&str>, root: Option<&str>) -> String {
    overlay
        .or_else(|| meaningful(root))
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Trait list for display: the first non-empty list in overlay precedence,
/// then the root list.
pub fn resolve_traits(citizen: &Citizen, market: Market) -> &[String] {
    precedence(market)
        .filter_map(|m| citizen.profiles.get(m))
        .map(|profile| profile.traits.as_slice())
        .find(|traits| !traits.is_empty())
        .unwrap_or(citizen.traits.as_slice())
}

/// Current life state: the market's localized state, then `current_state`.
pub fn resolve_life_state(bazi: &BaziProfile, market: Market) -> Option<&str> {
    meaningful(bazi.localized_state.get(market.code()).map(String::as_str))
        .or_else(|| meaningful(bazi.current_state.as_deref()))
}

/// Chart structure label, preferring the English variant in English markets.
pub fn resolve_structure(bazi: &BaziProfile, market: Market) -> Option<&str> {
    let han = meaningful(bazi.structure.as_deref());
    let english = meaningful(bazi.structure_en.as_deref());
    if market.is_english() {
        english.or(han)
    } else {
        han.or(english)
    }
}

/// Stable avatar seed for a citizen: 64-bit FNV-1a over the id string.
///
/// Depends only on the id, so the same citizen keeps the same avatar in
/// every market.
pub fn avatar_seed(id: &CitizenId) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    id.to_string()
        .bytes()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citizen::{MarketProfile, MarketProfiles};

    fn overlay_profile(name: &str, city: &str, job: &str, pain: Option<&str>) -> MarketProfile {
        MarketProfile {
            name: Some(name.into()),
            city: Some(city.into()),
            job: Some(job.into()),
            pain: pain.map(String::from),
            traits: Vec::new(),
        }
    }

    fn citizen() -> Citizen {
        Citizen {
            id: CitizenId::Number(7),
            name: Some("陳志明".into()),
            age: Some(41),
            gender: Some("male".into()),
            location: Some("Taipei".into()),
            occupation: Some("工程師".into()),
            traits: vec!["內向".into()],
            profiles: MarketProfiles::default(),
            bazi_profile: BaziProfile::default(),
        }
    }

    #[test]
    fn placeholder_city_falls_back_to_root_location() {
        let mut c = citizen();
        c.profiles.us = Some(overlay_profile("Jimmy Chen", "Unknown", "Engineer", None));
        let resolved = resolve(&c, Market::Us);
        assert_eq!(resolved.city, "Taipei");
        assert_eq!(resolved.name, "Jimmy Chen");
        assert_eq!(resolved.job, "Engineer");
    }

    #[test]
    fn pain_absent_without_overlay_pain() {
        let mut c = citizen();
        c.profiles.us = Some(overlay_profile("Jimmy Chen", "Austin", "Engineer", None));
        c.profiles.tw = Some(overlay_profile("陳志明", "台北", "工程師", Some("None")));
        assert_eq!(resolve(&c, Market::Us).pain, None);
        assert_eq!(resolve(&c, Market::Tw).pain, None);
    }

    #[test]
    fn tw_overlay_backs_other_markets() {
        let mut c = citizen();
        c.profiles.tw = Some(overlay_profile("陳志明", "新竹", "韌體工程師", Some("加班太多")));
        c.profiles.cn = Some(MarketProfile {
            job: Some("固件工程师".into()),
            ..Default::default()
        });
        let resolved = resolve(&c, Market::Cn);
        assert_eq!(resolved.job, "固件工程师");
        assert_eq!(resolved.city, "新竹");
        assert_eq!(resolved.pain.as_deref(), Some("加班太多"));
    }

    #[test]
    fn fields_resolve_independently() {
        let mut c = citizen();
        c.profiles.us = Some(MarketProfile {
            job: Some("Sales Lead".into()),
            city: Some("".into()),
            ..Default::default()
        });
        let resolved = resolve(&c, Market::Us);
        assert_eq!(resolved.job, "Sales Lead");
        assert_eq!(resolved.city, "Taipei");
        assert_eq!(resolved.name, "陳志明");
    }

    #[test]
    fn missing_everywhere_is_unknown() {
        let mut c = citizen();
        c.name = None;
        c.location = Some("未知".into());
        c.occupation = Some("".into());
        let resolved = resolve(&c, Market::Cn);
        assert_eq!(resolved.name, UNKNOWN);
        assert_eq!(resolved.city, UNKNOWN);
        assert_eq!(resolved.job, UNKNOWN);
        assert_eq!(resolved.pain, None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut c = citizen();
        c.profiles.us = Some(overlay_profile("Jimmy Chen", "none", "Engineer", Some("Churn")));
        for market in Market::ALL {
            assert_eq!(resolve(&c, market), resolve(&c, market));
        }
    }

    #[test]
    fn pain_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(resolve(&citizen(), Market::Tw)).unwrap();
        assert!(json.get("pain").is_none());
        assert_eq!(json["city"], "Taipei");
    }

    #[test]
    fn traits_follow_overlay_precedence() {
        let mut c = citizen();
        assert_eq!(resolve_traits(&c, Market::Us), ["內向".to_string()]);
        c.profiles.us = Some(MarketProfile {
            traits: vec!["Introverted".into(), "Frugal".into()],
            ..Default::default()
        });
        assert_eq!(resolve_traits(&c, Market::Us)[0], "Introverted");
        assert_eq!(resolve_traits(&c, Market::Cn)[0], "內向");
    }

    #[test]
    fn life_state_prefers_localized() {
        let mut bazi = BaziProfile {
            current_state: Some("穩定".into()),
            ..Default::default()
        };
        bazi.localized_state.insert("US".into(), "Settling in".into());
        bazi.localized_state.insert("CN".into(), "未知".into());
        assert_eq!(resolve_life_state(&bazi, Market::Us), Some("Settling in"));
        assert_eq!(resolve_life_state(&bazi, Market::Cn), Some("穩定"));
        assert_eq!(resolve_life_state(&bazi, Market::Tw), Some("穩定"));
        bazi.current_state = None;
        assert_eq!(resolve_life_state(&bazi, Market::Tw), None);
    }

    #[test]
    fn structure_prefers_english_for_us() {
        let bazi = BaziProfile {
            structure: Some("正官格".into()),
            structure_en: Some("Direct Officer".into()),
            ..Default::default()
        };
        assert_eq!(resolve_structure(&bazi, Market::Us), Some("Direct Officer"));
        assert_eq!(resolve_structure(&bazi, Market::Tw), Some("正官格"));
        let han_only = BaziProfile {
            structure: Some("正官格".into()),
            ..Default::default()
        };
        assert_eq!(resolve_structure(&han_only, Market::Us), Some("正官格"));
    }

    #[test]
    fn avatar_seed_depends_only_on_id() {
        let a = avatar_seed(&CitizenId::Number(7));
        assert_eq!(a, avatar_seed(&CitizenId::Text("7".into())));
        assert_ne!(a, avatar_seed(&CitizenId::Number(8)));
        // FNV-1a of the empty string is the offset basis.
        assert_eq!(avatar_seed(&CitizenId::Text(String::new())), 0xcbf2_9ce4_8422_2325);
    }
}
