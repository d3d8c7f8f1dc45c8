//! Four-pillar charts and element themes.
//!
//! A recorded pillar string is used verbatim when it parses into four
//! tokens. Otherwise a placeholder chart is drawn from the sixty-pair
//! stem/branch cycle so the profile still renders in the same format.
//! Placeholder charts carry [`Provenance::Placeholder`], are not
//! serialisable, and are never written back onto the citizen.

use std::fmt;

use rand::Rng;
use tracing::trace;

use crate::citizen::BaziProfile;
use crate::market::Market;
use crate::presence::meaningful;

const STEMS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];
const BRANCHES: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

/// Length of the stem/branch cycle.
pub const CYCLE_LEN: usize = 60;

/// Label of the `index`-th pair in the sixty-pair cycle (wrapping).
pub fn cycle_label(index: usize) -> String {
    let i = index % CYCLE_LEN;
    let mut label = String::with_capacity(6);
    label.push(STEMS[i % STEMS.len()]);
    label.push(BRANCHES[i % BRANCHES.len()]);
    label
}

// ── Elements ──

/// One of the five element theme buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementTheme {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl ElementTheme {
    pub const ALL: [ElementTheme; 5] = [
        ElementTheme::Wood,
        ElementTheme::Fire,
        ElementTheme::Earth,
        ElementTheme::Metal,
        ElementTheme::Water,
    ];

    /// Parse a Han character, an English word, or a mixed label like `"Fire 火"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let from_han = raw.chars().find_map(|c| match c {
            '木' => Some(ElementTheme::Wood),
            '火' => Some(ElementTheme::Fire),
            '土' => Some(ElementTheme::Earth),
            '金' => Some(ElementTheme::Metal),
            '水' => Some(ElementTheme::Water),
            _ => None,
        });
        if from_han.is_some() {
            return from_han;
        }

        raw.split(|c: char| !c.is_ascii_alphabetic())
            .find_map(|word| match word.to_ascii_lowercase().as_str() {
                "wood" => Some(ElementTheme::Wood),
                "fire" => Some(ElementTheme::Fire),
                "earth" => Some(ElementTheme::Earth),
                "metal" => Some(ElementTheme::Metal),
                "water" => Some(ElementTheme::Water),
                _ => None,
            })
    }

    /// Theme for a profile's element field. Absent or unrecognised values are Earth.
    pub fn from_profile(element: Option<&str>) -> Self {
        meaningful(element)
            .and_then(Self::parse)
            .unwrap_or(ElementTheme::Earth)
    }

    pub fn han(self) -> &'static str {
        match self {
            ElementTheme::Wood => "木",
            ElementTheme::Fire => "火",
            ElementTheme::Earth => "土",
            ElementTheme::Metal => "金",
            ElementTheme::Water => "水",
        }
    }

    pub fn english(self) -> &'static str {
        match self {
            ElementTheme::Wood => "Wood",
            ElementTheme::Fire => "Fire",
            ElementTheme::Earth => "Earth",
            ElementTheme::Metal => "Metal",
            ElementTheme::Water => "Water",
        }
    }

    pub fn label(self, market: Market) -> &'static str {
        if market.is_english() {
            self.english()
        } else {
            self.han()
        }
    }
}

// ── Pillars ──

/// Year, month, day and hour pillars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FourPillars {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
}

impl FourPillars {
    /// Parse a Han pillar string: four two-character tokens, either separated
    /// (`"甲子 乙丑 丙寅 丁卯"`) or packed (`"甲子乙丑丙寅丁卯"`).
    pub fn parse(raw: &str) -> Option<Self> {
        let tokens = split_tokens(raw);
        let tokens: Vec<String> = match tokens.as_slice() {
            [packed] => {
                let chars: Vec<char> = packed.chars().collect();
                if chars.len() != 8 {
                    return None;
                }
                chars.chunks(2).map(|pair| pair.iter().collect()).collect()
            }
            _ => tokens.iter().map(|t| t.to_string()).collect(),
        };
        if tokens.len() != 4 || tokens.iter().any(|t| t.chars().count() != 2) {
            return None;
        }
        Self::from_tokens(tokens)
    }

    /// Parse a romanised pillar string: any four separated tokens
    /// (`"Jia-Zi Yi-Chou Bing-Yin Ding-Mao"`).
    pub fn parse_romanized(raw: &str) -> Option<Self> {
        let tokens = split_tokens(raw);
        if tokens.len() != 4 {
            return None;
        }
        Self::from_tokens(tokens.into_iter().map(str::to_string).collect())
    }

    fn from_tokens(tokens: Vec<String>) -> Option<Self> {
        let [year, month, day, hour]: [String; 4] = tokens.try_into().ok()?;
        Some(Self {
            year,
            month,
            day,
            hour,
        })
    }

    fn placeholder<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut draw = || cycle_label(rng.gen_range(0..CYCLE_LEN));
        Self {
            year: draw(),
            month: draw(),
            day: draw(),
            hour: draw(),
        }
    }

    pub fn tokens(&self) -> [&str; 4] {
        [&self.year, &self.month, &self.day, &self.hour]
    }
}

impl fmt::Display for FourPillars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}

fn split_tokens(raw: &str) -> Vec<&str> {
    raw.split(|c: char| c.is_whitespace() || matches!(c, ',' | '，' | '|' | '/'))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Where a chart's pillars came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Recorded,
    Placeholder,
}

/// A complete chart ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PillarChart {
    pub pillars: FourPillars,
    pub element: ElementTheme,
    pub provenance: Provenance,
}

/// Build a complete chart for a profile in the given market.
///
/// The US market prefers the romanised `four_pillars_en`, falling back to the
/// Han string. When neither parses, placeholder pillars are drawn from `rng`.
/// Romanised tokens (`"Jia-Zi"`) are not two characters long, so US charts
/// may carry a different token shape than the Han pillars.
pub fn synthesize<R: Rng + ?Sized>(bazi: &BaziProfile, market: Market, rng: &mut R) -> PillarChart {
    let element = ElementTheme::from_profile(bazi.element.as_deref());

    let english = market
        .is_english()
        .then(|| meaningful(bazi.four_pillars_en.as_deref()))
        .flatten()
        .and_then(FourPillars::parse_romanized);
    let recorded = english.or_else(|| {
        meaningful(bazi.four_pillars.as_deref()).and_then(FourPillars::parse)
    });

    match recorded {
        Some(pillars) => PillarChart {
            pillars,
            element,
            provenance: Provenance::Recorded,
        },
        None => {
            trace!(raw = ?bazi.four_pillars, "pillars missing or malformed, using placeholder");
            PillarChart {
                pillars: FourPillars::placeholder(rng),
                element,
                provenance: Provenance::Placeholder,
            }
        }
    }
}
