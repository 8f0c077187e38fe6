//! Shared types for the tidal stations widget
//!
//! This crate contains the types that are shared between the config-system,
//! data-manager and wasm-bridge crates: stations, scales, the raw payloads
//! fetched from the flooding API, the derived series, pointer events and
//! popover state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod clock;
pub mod errors;
pub mod events;
pub mod popover;
pub mod series;
pub mod station_data;
pub mod update_request;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{ErrorResponse, WidgetError, WidgetResult};
pub use events::{ChartPoint, PointerEvent, PointerKind};
pub use popover::{PopoverContent, PopoverGeometry, PopoverMode, PopoverPosition};
pub use series::SeriesSet;
pub use station_data::{
    AnnualFloodCount, AnnualProjection, FloodSeverity, HistoricalPayload, ProjectionPayload,
    RawStationData,
};
pub use update_request::{PartialUpdate, UpdateRequest};

/// Tide-gauge station identifier, used as both the fetch and the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Station(String);

impl Station {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Station {
    fn from(id: &str) -> Self {
        Station::new(id)
    }
}

impl From<String> for Station {
    fn from(id: String) -> Self {
        Station::new(id)
    }
}

/// Axis zoom preset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// 1950 through 2100
    #[default]
    Full,
    /// 1950 through the current year
    Historical,
}

impl Scale {
    pub fn toggled(self) -> Scale {
        match self {
            Scale::Full => Scale::Historical,
            Scale::Historical => Scale::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Full => "full",
            Scale::Historical => "historical",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Scale::Full),
            "historical" => Ok(Scale::Historical),
            other => Err(WidgetError::InvalidConfig {
                message: format!("unknown scale '{other}'"),
                field: Some("scale".to_string()),
            }),
        }
    }
}

/// Inclusive range of years covered by the chart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Position of `year` within the range, if it is covered
    pub fn index_of(&self, year: i32) -> Option<usize> {
        self.contains(year).then(|| (year - self.start) as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: 1920,
            end: 2100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range() {
        let range = YearRange::default();
        assert_eq!(range.len(), 181);
        assert!(range.contains(1950));
        assert!(!range.contains(1919));
        assert_eq!(range.index_of(1920), Some(0));
        assert_eq!(range.index_of(2100), Some(180));
        assert_eq!(range.index_of(2101), None);
        assert!(YearRange::new(2000, 1999).is_empty());
    }

    #[test]
    fn test_scale_toggle_and_parse() {
        assert_eq!(Scale::Full.toggled(), Scale::Historical);
        assert_eq!(Scale::Historical.toggled().toggled(), Scale::Historical);
        assert_eq!("historical".parse::<Scale>().unwrap(), Scale::Historical);
        assert!("zoomed".parse::<Scale>().is_err());

        let json = serde_json::to_string(&Scale::Historical).unwrap();
        assert_eq!(json, "\"historical\"");
    }

    #[test]
    fn test_station_trims_and_serializes_transparently() {
        let station = Station::new(" 8454000 ");
        assert_eq!(station.as_str(), "8454000");
        assert_eq!(serde_json::to_string(&station).unwrap(), "\"8454000\"");
        assert!(Station::new("").is_empty());
    }
}
