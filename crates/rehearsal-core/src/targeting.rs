//! Audience sizing by Fermi decomposition.
//!
//! A market's base population is derated by successive multiplicative
//! factors to estimate the total addressable market (TAM) for a targeting
//! filter:
//!
//! 1. Age: `min(1, span / 60)`. A full 0-60+ span imposes no derating.
//! 2. Gender: `0.52` when a single gender is selected.
//! 3. Occupation: `min(1, tags * 0.15)` when any tags are selected.
//!
//! The floored product is the value of record. [`jittered`] adds bounded
//! noise for display only; it never feeds a submission.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::CoreError;
use crate::market::Market;

/// Upper bound of the age slider. A range ending here means "60+".
pub const AGE_CEILING: u8 = 60;
/// Span (in years) at which the age factor reaches 1.
pub const AGE_REFERENCE_SPAN: f64 = 60.0;
/// Assumed single-gender share of a population.
pub const GENDER_SHARE: f64 = 0.52;
/// Reach contributed by each selected occupation tag.
pub const OCCUPATION_SHARE_PER_TAG: f64 = 0.15;
/// Personas sampled per simulation, independent of TAM.
pub const SAMPLE_SIZE: u32 = 1_000;
/// Largest display jitter, in people.
pub const JITTER_BOUND: u64 = 5_000;

// ── Filter types ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    All,
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::All => "all",
            Gender::Male => "male",
            Gender::Female => "female",
        })
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Gender::All),
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(CoreError::UnknownGender(s.to_string())),
        }
    }
}

/// Inclusive `[min, max]` age bounds, serialised as a two-element array.
///
/// Both bounds are clamped to [`AGE_CEILING`]; a max at the ceiling is open-ended.
/// Decoding goes through [`AgeRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)")]
pub struct AgeRange(u8, u8);

impl AgeRange {
    pub fn new(min: u8, max: u8) -> Result<Self, CoreError> {
        let (min, max) = (min.min(AGE_CEILING), max.min(AGE_CEILING));
        if min > max {
            return Err(CoreError::InvalidAgeRange { min, max });
        }
        Ok(Self(min, max))
    }

    pub fn min(&self) -> u8 {
        self.0
    }

    pub fn max(&self) -> u8 {
        self.1
    }

    pub fn span(&self) -> u8 {
        self.1.saturating_sub(self.0)
    }

    pub fn is_open_ended(&self) -> bool {
        self.1 >= AGE_CEILING
    }
}

impl TryFrom<(u8, u8)> for AgeRange {
    type Error = CoreError;

    fn try_from((min, max): (u8, u8)) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

impl Default for AgeRange {
    fn default() -> Self {
        Self(18, AGE_CEILING)
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open_ended() {
            write!(f, "{}-{}+", self.0, self.1)
        } else {
            write!(f, "{}-{}", self.0, self.1)
        }
    }
}

/// Parses `"18-45"` or `"25-60+"`.
impl FromStr for AgeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoreError::MalformedAgeRange(s.to_string());
        let (lo, hi) = s.trim().split_once('-').ok_or_else(malformed)?;
        let lo: u8 = lo.trim().parse().map_err(|_| malformed())?;
        let hi: u8 = hi
            .trim()
            .trim_end_matches('+')
            .parse()
            .map_err(|_| malformed())?;
        Self::new(lo, hi)
    }
}

/// A user-editable targeting filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingConfig {
    pub age_range: AgeRange,
    pub gender: Gender,
    pub occupations: BTreeSet<String>,
    pub market: Market,
}

// ── Estimation ──

/// The individual derating factors behind an estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakdown {
    pub base_population: u64,
    pub age_factor: f64,
    pub gender_factor: f64,
    pub occupation_factor: f64,
}

impl Breakdown {
    pub fn of(config: &TargetingConfig) -> Self {
        let age_factor = (f64::from(config.age_range.span()) / AGE_REFERENCE_SPAN).min(1.0);
        let gender_factor = match config.gender {
            Gender::All => 1.0,
            Gender::Male | Gender::Female => GENDER_SHARE,
        };
        let occupation_factor = if config.occupations.is_empty() {
            1.0
        } else {
            (config.occupations.len() as f64 * OCCUPATION_SHARE_PER_TAG).min(1.0)
        };

        Self {
            base_population: config.market.config().base_population,
            age_factor,
            gender_factor,
            occupation_factor,
        }
    }

    /// Deterministic TAM: the floored product of base population and all factors.
    pub fn tam(&self) -> u64 {
        let raw = self.base_population as f64
            * self.age_factor
            * self.gender_factor
            * self.occupation_factor;
        if raw.is_finite() && raw > 0.0 {
            raw.floor() as u64
        } else {
            0
        }
    }
}

/// Estimate the addressable population for a targeting filter.
///
/// Always recomputed from the market's base population. A zero-width age
/// range yields 0, which callers must surface as a warning.
pub fn estimate(config: &TargetingConfig) -> u64 {
    Breakdown::of(config).tam()
}

/// Add display-only noise to a TAM.
///
/// The offset is bounded by [`JITTER_BOUND`] and by a tenth of the value, so
/// the figure stays within 10% of the deterministic one. Zero stays zero.
pub fn jittered<R: Rng + ?Sized>(tam: u64, rng: &mut R) -> u64 {
    let bound = JITTER_BOUND.min(tam / 10);
    if bound == 0 {
        return tam;
    }
    let bound = bound as i64;
    tam.saturating_add_signed(rng.gen_range(-bound..=bound))
}

// ── Form session ──

/// Why a targeting filter cannot be submitted.
///
/// The narrowest non-empty filter (a one-year span, one gender, one tag)
/// still leaves tens of thousands in the smallest market, so an empty
/// population is the only case that blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetingWarning {
    #[error("targeting range is empty: no addressable population")]
    EmptyPopulation,
}

/// Payload carried with a simulation request. `tam` is never jittered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingSubmission {
    #[serde(flatten)]
    pub config: TargetingConfig,
    pub tam: u64,
    pub sample_size: u32,
}

/// One targeting form session.
///
/// Every mutation recomputes the TAM synchronously. The session is consumed
/// by [`submit`](Self::submit).
#[derive(Debug, Clone)]
pub struct TargetingSession {
    config: TargetingConfig,
    tam: u64,
}

impl Default for TargetingSession {
    fn default() -> Self {
        Self::new(TargetingConfig::default())
    }
}

impl TargetingSession {
    pub fn new(config: TargetingConfig) -> Self {
        let tam = estimate(&config);
        Self { config, tam }
    }

    pub fn config(&self) -> &TargetingConfig {
        &self.config
    }

    pub fn tam(&self) -> u64 {
        self.tam
    }

    pub fn breakdown(&self) -> Breakdown {
        Breakdown::of(&self.config)
    }

    pub fn set_age_range(&mut self, min: u8, max: u8) -> Result<(), CoreError> {
        self.config.age_range = AgeRange::new(min, max)?;
        self.recompute();
        Ok(())
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.config.gender = gender;
        self.recompute();
    }

    /// Select the tag if unselected, deselect it otherwise. Returns whether it is now selected.
    pub fn toggle_occupation(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let selected = if self.config.occupations.remove(&tag) {
            false
        } else {
            self.config.occupations.insert(tag);
            true
        };
        self.recompute();
        selected
    }

    pub fn set_market(&mut self, market: Market) {
        self.config.market = market;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.tam = estimate(&self.config);
        debug!(
            market = %self.config.market,
            age = %self.config.age_range,
            gender = %self.config.gender,
            occupations = self.config.occupations.len(),
            tam = self.tam,
            "targeting estimate updated"
        );
    }

    pub fn validation(&self) -> Result<(), TargetingWarning> {
        if self.tam == 0 {
            return Err(TargetingWarning::EmptyPopulation);
        }
        Ok(())
    }

    /// TAM with display jitter applied. Not for submission.
    pub fn display_tam<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        jittered(self.tam, rng)
    }

    pub fn submit(self) -> Result<TargetingSubmission, TargetingWarning> {
        self.validation()?;
        Ok(TargetingSubmission {
            config: self.config,
            tam: self.tam,
            sample_size: SAMPLE_SIZE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(market: Market, min: u8, max: u8) -> TargetingConfig {
        TargetingConfig {
            age_range: AgeRange::new(min, max).unwrap(),
            market,
            ..Default::default()
        }
    }

    #[test]
    fn zero_width_age_range_is_empty_in_every_market() {
        for market in Market::ALL {
            for age in [0, 18, 35, 60] {
                let mut cfg = config(market, age, age);
                assert_eq!(estimate(&cfg), 0, "{market} {age}-{age}");
                cfg.gender = Gender::Female;
                cfg.occupations.insert("engineer".into());
                assert_eq!(estimate(&cfg), 0);
            }
        }
    }

    #[test]
    fn full_span_keeps_base_population() {
        for market in Market::ALL {
            assert_eq!(
                estimate(&config(market, 0, 60)),
                market.config().base_population
            );
        }
    }

    #[test]
    fn half_span_halves_population() {
        assert_eq!(estimate(&config(Market::Tw, 20, 50)), 11_750_000);
    }

    #[test]
    fn monotonic_in_age_span() {
        for market in Market::ALL {
            let mut previous = 0;
            for max in 18..=AGE_CEILING {
                let mut cfg = config(market, 18, max);
                cfg.gender = Gender::Male;
                cfg.occupations.insert("designer".into());
                let tam = estimate(&cfg);
                assert!(tam >= previous, "{market} 18-{max}: {tam} < {previous}");
                previous = tam;
            }
        }
    }

    #[test]
    fn gender_filter_applies_single_gender_share() {
        let mut cfg = config(Market::Us, 0, 60);
        cfg.gender = Gender::Female;
        let expected = 330_000_000.0 * GENDER_SHARE;
        assert!((estimate(&cfg) as f64 - expected).abs() <= 1.0);
        cfg.gender = Gender::Male;
        assert!((estimate(&cfg) as f64 - expected).abs() <= 1.0);
    }

    #[test]
    fn occupation_factor_grows_with_tags_and_caps() {
        let mut cfg = config(Market::Cn, 0, 60);
        let mut previous = 0;
        for (i, tag) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
            cfg.occupations.insert((*tag).into());
            let breakdown = Breakdown::of(&cfg);
            let expected = ((i + 1) as f64 * OCCUPATION_SHARE_PER_TAG).min(1.0);
            assert!((breakdown.occupation_factor - expected).abs() < 1e-12);
            assert!(breakdown.tam() >= previous);
            previous = breakdown.tam();
        }
        cfg.occupations.insert("g".into());
        cfg.occupations.insert("h".into());
        assert_eq!(Breakdown::of(&cfg).occupation_factor, 1.0);
        assert_eq!(estimate(&cfg), 1_400_000_000);
    }

    #[test]
    fn age_range_parse_and_display() {
        let open: AgeRange = "25-60+".parse().unwrap();
        assert_eq!((open.min(), open.max()), (25, 60));
        assert_eq!(open.to_string(), "25-60+");
        assert_eq!("18-45".parse::<AgeRange>().unwrap().to_string(), "18-45");
        // Bounds above the ceiling clamp to "60+".
        assert_eq!(AgeRange::new(30, 99).unwrap().max(), 60);
        assert!(matches!(
            "45-18".parse::<AgeRange>(),
            Err(CoreError::InvalidAgeRange { min: 45, max: 18 })
        ));
        assert!(matches!(
            "eighteen".parse::<AgeRange>(),
            Err(CoreError::MalformedAgeRange(_))
        ));
    }

    #[test]
    fn age_range_decoding_validates() {
        let clamped: AgeRange = serde_json::from_str("[0, 255]").unwrap();
        assert_eq!((clamped.min(), clamped.max()), (0, AGE_CEILING));
        assert!(serde_json::from_str::<AgeRange>("[50, 20]").is_err());
        let json = r#"{"ageRange": [60, 40], "gender": "all", "occupations": [], "market": "TW"}"#;
        assert!(serde_json::from_str::<TargetingConfig>(json).is_err());
    }

    #[test]
    fn narrowest_non_empty_filter_exceeds_sample_size() {
        for market in Market::ALL {
            let mut session = TargetingSession::new(config(market, 59, 60));
            session.set_gender(Gender::Female);
            session.toggle_occupation("farmer");
            assert!(session.tam() > u64::from(SAMPLE_SIZE), "{market}: {}", session.tam());
            assert_eq!(session.validation(), Ok(()));
        }
    }

    #[test]
    fn jitter_is_bounded_and_skips_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(jittered(0, &mut rng), 0);
        assert_eq!(jittered(9, &mut rng), 9);
        for _ in 0..1_000 {
            let big = jittered(23_500_000, &mut rng);
            assert!(big.abs_diff(23_500_000) <= JITTER_BOUND);
            let small = jittered(2_000, &mut rng);
            assert!(small.abs_diff(2_000) <= 200);
        }
    }

    #[test]
    fn session_recomputes_on_every_change() {
        let mut session = TargetingSession::new(config(Market::Tw, 0, 60));
        assert_eq!(session.tam(), 23_500_000);

        session.set_market(Market::Us);
        assert_eq!(session.tam(), 330_000_000);

        session.set_age_range(30, 60).unwrap();
        assert_eq!(session.tam(), 165_000_000);

        session.set_gender(Gender::Male);
        assert!(session.tam() < 165_000_000);

        assert!(session.toggle_occupation("nurse"));
        let with_tag = session.tam();
        assert!(!session.toggle_occupation("nurse"));
        assert!(session.tam() > with_tag);

        // Switching back recomputes from the new base, not by scaling.
        session.set_gender(Gender::All);
        session.set_market(Market::Tw);
        assert_eq!(session.tam(), 11_750_000);
    }

    #[test]
    fn rejected_age_range_leaves_session_unchanged() {
        let mut session = TargetingSession::default();
        let before = session.tam();
        assert!(session.set_age_range(50, 20).is_err());
        assert_eq!(session.tam(), before);
        assert_eq!(session.config().age_range, AgeRange::default());
    }

    #[test]
    fn empty_range_blocks_submission() {
        let mut session = TargetingSession::default();
        session.set_age_range(40, 40).unwrap();
        assert_eq!(session.validation(), Err(TargetingWarning::EmptyPopulation));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(session.display_tam(&mut rng), 0);
        assert_eq!(
            session.submit().unwrap_err(),
            TargetingWarning::EmptyPopulation
        );
    }

    #[test]
    fn submission_carries_unjittered_tam() {
        let mut session = TargetingSession::new(config(Market::Tw, 20, 50));
        session.toggle_occupation("retail");
        let tam = session.tam();
        let submission = session.submit().unwrap();
        assert_eq!(submission.tam, tam);
        assert_eq!(submission.sample_size, SAMPLE_SIZE);

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["ageRange"], serde_json::json!([20, 50]));
        assert_eq!(json["gender"], "all");
        assert_eq!(json["occupations"], serde_json::json!(["retail"]));
        assert_eq!(json["market"], "TW");
        assert_eq!(json["tam"], tam);
    }
}
