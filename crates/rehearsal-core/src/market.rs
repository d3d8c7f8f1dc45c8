//! Market codes and the static per-market configuration table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A market a rehearsal can target. Serialised as its two-letter code.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    #[default]
    Tw,
    Us,
    Cn,
}

/// Static configuration for one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketConfig {
    pub market: Market,
    /// Population the targeting estimate derates from.
    pub base_population: u64,
    /// ISO 4217 currency code.
    pub currency: &'static str,
    pub flag: &'static str,
    /// BCP 47 locale for number and label formatting.
    pub locale: &'static str,
}

pub const MARKETS: [MarketConfig; 3] = [
    MarketConfig {
        market: Market::Tw,
        base_population: 23_500_000,
        currency: "TWD",
        flag: "🇹🇼",
        locale: "zh-TW",
    },
    MarketConfig {
        market: Market::Us,
        base_population: 330_000_000,
        currency: "USD",
        flag: "🇺🇸",
        locale: "en-US",
    },
    MarketConfig {
        market: Market::Cn,
        base_population: 1_400_000_000,
        currency: "CNY",
        flag: "🇨🇳",
        locale: "zh-CN",
    },
];

impl Market {
    pub const ALL: [Market; 3] = [Market::Tw, Market::Us, Market::Cn];

    pub fn code(self) -> &'static str {
        match self {
            Market::Tw => "TW",
            Market::Us => "US",
            Market::Cn => "CN",
        }
    }

    pub fn config(self) -> &'static MarketConfig {
        match self {
            Market::Tw => &MARKETS[0],
            Market::Us => &MARKETS[1],
            Market::Cn => &MARKETS[2],
        }
    }

    /// Whether display values for this market prefer English variants.
    pub fn is_english(self) -> bool {
        matches!(self, Market::Us)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Market {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TW" => Ok(Market::Tw),
            "US" => Ok(Market::Us),
            "CN" => Ok(Market::Cn),
            _ => Err(CoreError::UnknownMarket(s.to_string())),
        }
    }
}
