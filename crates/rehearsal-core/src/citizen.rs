//! Citizen records as served by the genesis endpoint.
//!
//! Citizens are owned by the backend and treated as read-only here. Every
//! display value is derived into a separate view; nothing in this crate
//! writes back onto a [`Citizen`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::market::Market;
use crate::presence::meaningful;

/// Stable citizen identifier. The backend has served both integer and string ids.
///
/// Any other JSON scalar (a negative or fractional number, a bool) is kept
/// as its text form rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum CitizenId {
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for CitizenId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(match n.as_u64() {
                Some(n) => CitizenId::Number(n),
                None => CitizenId::Text(n.to_string()),
            }),
            Value::String(s) => Ok(CitizenId::Text(s)),
            Value::Bool(b) => Ok(CitizenId::Text(b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "citizen id must be a number or string, got {other}"
            ))),
        }
    }
}

impl fmt::Display for CitizenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitizenId::Number(n) => write!(f, "{n}"),
            CitizenId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for CitizenId {
    fn from(n: u64) -> Self {
        CitizenId::Number(n)
    }
}

impl From<&str> for CitizenId {
    fn from(s: &str) -> Self {
        CitizenId::Text(s.to_string())
    }
}

/// One synthetic persona.
///
/// Root attributes (`name`, `location`, ...) are the default-locale values;
/// `profiles` carries optional per-market overlays. Display-only numeric and
/// list fields decode leniently: a value of the wrong shape is dropped so one
/// odd record cannot fail the whole roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citizen {
    pub id: CitizenId,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub traits: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profiles: MarketProfiles,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bazi_profile: BaziProfile,
}

/// Per-market overlays keyed by market code. Unknown market keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketProfiles {
    #[serde(rename = "TW", default, skip_serializing_if = "Option::is_none")]
    pub tw: Option<MarketProfile>,
    #[serde(rename = "US", default, skip_serializing_if = "Option::is_none")]
    pub us: Option<MarketProfile>,
    #[serde(rename = "CN", default, skip_serializing_if = "Option::is_none")]
    pub cn: Option<MarketProfile>,
}

impl MarketProfiles {
    pub fn get(&self, market: Market) -> Option<&MarketProfile> {
        match market {
            Market::Tw => self.tw.as_ref(),
            Market::Us => self.us.as_ref(),
            Market::Cn => self.cn.as_ref(),
        }
    }
}

/// A locale-specific partial record. Any field may be absent or a placeholder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketProfile {
    pub name: Option<String>,
    pub city: Option<String>,
    pub job: Option<String>,
    /// Localized pain point. Has no root-level counterpart.
    pub pain: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub traits: Vec<String>,
}

/// Astrological record. Pillars may be missing; see [`crate::pillars`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaziProfile {
    /// Wood/Fire/Earth/Metal/Water, as a Han character or English word.
    pub element: Option<String>,
    pub structure: Option<String>,
    pub structure_en: Option<String>,
    /// Year, month, day and hour pillars, e.g. `"甲子 乙丑 丙寅 丁卯"`.
    pub four_pillars: Option<String>,
    pub four_pillars_en: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub birth_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub birth_month: Option<u32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub birth_day: Option<u32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub birth_hour: Option<u32>,
    /// Two-hour period label, used when `birth_hour` is unknown.
    pub birth_shichen: Option<String>,
    /// Market code → free-text current life state. Non-text entries are skipped.
    #[serde(default, deserialize_with = "lenient_state")]
    pub localized_state: HashMap<String, String>,
    pub current_state: Option<String>,
}

impl BaziProfile {
    /// Birth date line for display: `YYYY-MM-DD` plus hour or shichen when known.
    ///
    /// Returns `None` when the birth year is missing.
    pub fn birth_line(&self) -> Option<String> {
        let year = self.birth_year?;
        let mut line = format!("{year:04}");
        if let Some(month) = self.birth_month {
            line.push_str(&format!("-{month:02}"));
            if let Some(day) = self.birth_day {
                line.push_str(&format!("-{day:02}"));
            }
        }
        if let Some(hour) = self.birth_hour {
            line.push_str(&format!(" {hour:02}:00"));
        } else if let Some(shichen) = meaningful(self.birth_shichen.as_deref()) {
            line.push_str(&format!(" {shichen}"));
        }
        Some(line)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Lenient field decoding ──

/// An integer given as a JSON integer, a whole float (`34.0`), or a numeric
/// string (`"34"`). Anything else, or a value out of range for `T`, is absent.
fn lenient_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let n = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(n.and_then(|n| T::try_from(n).ok()))
}

/// A string list where `null` and non-string items are dropped.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// A market-code map where `null` and non-string values are dropped.
fn lenient_state<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => entries,
        _ => return Ok(HashMap::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|(market, state)| match state {
            Value::String(s) => Some((market, s)),
            _ => None,
        })
        .collect())
}
