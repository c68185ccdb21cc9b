//! Aggregation resolution definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ResolutionParseError;

/// One aggregation granularity of the pipeline.
///
/// [`Resolution::Minute1`] is the base resolution: it is the only one fed
/// directly from the snapshot source, every other resolution resamples its
/// finalized windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    /// 1-minute windows.
    #[serde(rename = "1m")]
    Minute1,
    /// 5-minute windows.
    #[serde(rename = "5m")]
    Minute5,
    /// 10-minute windows.
    #[serde(rename = "10m")]
    Minute10,
    /// 15-minute windows.
    #[serde(rename = "15m")]
    Minute15,
    /// 30-minute windows.
    #[serde(rename = "30m")]
    Minute30,
    /// 1-hour windows.
    #[serde(rename = "1h")]
    Hour1,
    /// Daily windows (UTC days).
    #[serde(rename = "1d")]
    Day1,
    /// Calendar-week windows closing at the end of Sunday (UTC).
    #[serde(rename = "1w")]
    Week1,
}

impl Resolution {
    /// Seconds in one minute.
    pub const MINUTE: i64 = 60;
    /// Seconds in one hour.
    pub const HOUR: i64 = 60 * Self::MINUTE;
    /// Seconds in one day.
    pub const DAY: i64 = 24 * Self::HOUR;
    /// Seconds in one week.
    pub const WEEK: i64 = 7 * Self::DAY;

    /// The resolution fed directly by the snapshot source.
    pub const BASE: Self = Self::Minute1;

    /// Returns the window length in seconds.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        match self {
            Self::Minute1 => Self::MINUTE,
            Self::Minute5 => 5 * Self::MINUTE,
            Self::Minute10 => 10 * Self::MINUTE,
            Self::Minute15 => 15 * Self::MINUTE,
            Self::Minute30 => 30 * Self::MINUTE,
            Self::Hour1 => Self::HOUR,
            Self::Day1 => Self::DAY,
            Self::Week1 => Self::WEEK,
        }
    }

    /// Returns the resolution as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute10 => "10m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1h",
            Self::Day1 => "1d",
            Self::Week1 => "1w",
        }
    }

    /// Returns the suffix appended to the table prefix for this resolution.
    #[must_use]
    pub const fn table_suffix(&self) -> &'static str {
        match self {
            Self::Minute1 => "min",
            Self::Minute5 => "5min",
            Self::Minute10 => "10min",
            Self::Minute15 => "15min",
            Self::Minute30 => "30min",
            Self::Hour1 => "hour",
            Self::Day1 => "day",
            Self::Week1 => "week",
        }
    }

    /// Returns the storage table name for this resolution under `prefix`.
    #[must_use]
    pub fn table_name(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.table_suffix())
    }

    /// Returns all resolutions, base first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute10,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Day1,
            Self::Week1,
        ]
    }

    /// Returns every resolution that resamples from the base.
    #[must_use]
    pub fn derived() -> &'static [Self] {
        &Self::all()[1..]
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "m1" | "min" | "minute" => Ok(Self::Minute1),
            "5m" | "m5" | "5min" => Ok(Self::Minute5),
            "10m" | "m10" | "10min" => Ok(Self::Minute10),
            "15m" | "m15" | "15min" => Ok(Self::Minute15),
            "30m" | "m30" | "30min" => Ok(Self::Minute30),
            "1h" | "h1" | "hour" => Ok(Self::Hour1),
            "1d" | "d1" | "day" | "daily" => Ok(Self::Day1),
            "1w" | "w1" | "week" | "weekly" => Ok(Self::Week1),
            _ => Err(ResolutionParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_seconds() {
        assert_eq!(Resolution::Minute1.seconds(), 60);
        assert_eq!(Resolution::Minute10.seconds(), 600);
        assert_eq!(Resolution::Hour1.seconds(), 3600);
        assert_eq!(Resolution::Day1.seconds(), 86400);
        assert_eq!(Resolution::Week1.seconds(), 604_800);
    }

    #[test]
    fn test_resolution_parse() {
        assert_eq!("1m".parse::<Resolution>().unwrap(), Resolution::Minute1);
        assert_eq!("H1".parse::<Resolution>().unwrap(), Resolution::Hour1);
        assert_eq!("week".parse::<Resolution>().unwrap(), Resolution::Week1);
        assert!("4h".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_table_names() {
        assert_eq!(
            Resolution::Minute1.table_name("coinmarketcap"),
            "coinmarketcapmin"
        );
        assert_eq!(
            Resolution::Week1.table_name("coinmarketcap"),
            "coinmarketcapweek"
        );
    }

    #[test]
    fn test_derived_excludes_base() {
        let derived = Resolution::derived();
        assert_eq!(derived.len(), 7);
        assert!(!derived.contains(&Resolution::BASE));
    }
}
