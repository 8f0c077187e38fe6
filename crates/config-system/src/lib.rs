//! Configuration system for the tidal stations widget
//! Manages widget options, their defaults, override merging, validation and
//! the per-scale chart layout.

use serde::{Deserialize, Serialize};
use shared_types::{FloodSeverity, Scale, Station, WidgetResult, YearRange};

pub mod colors;
pub mod layout;
pub mod presets;
pub mod validation;

pub use colors::{rgba, BandColors, ColorPalette, HistoricalColors, Opacity, Rgb};
pub use layout::{export_layout, render_layout, restore_layout, ScaleRanges};
pub use validation::OptionsValidator;

/// Default endpoint for annual observed flood counts
pub const DEFAULT_HISTORICAL_URL: &str =
    "https://api.tidesandcurrents.noaa.gov/dpapi/prod/webapi/htf/htf_annual.json";

/// Default endpoint for annual flood projections
pub const DEFAULT_PROJECTION_URL: &str =
    "https://api.tidesandcurrents.noaa.gov/dpapi/prod/webapi/htf/htf_projection_annual.json";

/// Complete widget configuration, merged over the defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    pub responsive: bool,
    pub station: Option<Station>,
    pub scale: Scale,
    pub data: DataOptions,
    /// Base chart layout; axis ranges are recomputed from it on every render
    pub layout: serde_json::Value,
    /// Passed through to the chart untouched
    pub config: serde_json::Value,
    pub colors: ColorPalette,
    pub years: YearRange,
    pub popover: PopoverOptions,
    pub export: ExportOptions,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            responsive: true,
            station: None,
            scale: Scale::Full,
            data: DataOptions::default(),
            layout: layout::default_layout(),
            config: layout::default_chart_config(),
            colors: ColorPalette::default(),
            years: YearRange::default(),
            popover: PopoverOptions::default(),
            export: ExportOptions::default(),
        }
    }
}

impl WidgetOptions {
    /// Deep-merges caller overrides over the defaults and validates the result
    pub fn from_overrides(overrides: serde_json::Value) -> WidgetResult<Self> {
        presets::apply_overrides(&WidgetOptions::default(), overrides)
    }

    /// The configured station, treating an empty id as none
    pub fn station(&self) -> Option<&Station> {
        self.station.as_ref().filter(|station| !station.is_empty())
    }
}

/// Where station data comes from and how it is kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataOptions {
    pub historical_url: String,
    pub projection_url: String,
    pub severity: FloodSeverity,
    pub cache_policy: CachePolicy,
    /// Per-request timeout for both payload fetches
    pub timeout_ms: u32,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self {
            historical_url: DEFAULT_HISTORICAL_URL.to_string(),
            projection_url: DEFAULT_PROJECTION_URL.to_string(),
            severity: FloodSeverity::Minor,
            cache_policy: CachePolicy::Unbounded,
            timeout_ms: 30_000,
        }
    }
}

/// Eviction policy of the station cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CachePolicy {
    /// Keep every fetched station for the lifetime of the page
    #[default]
    Unbounded,
    /// Keep at most `capacity` stations, evicting the least recently used
    Lru { capacity: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopoverOptions {
    /// Delay during which a show request cancels a pending hide
    pub debounce_ms: u64,
    /// Decimal places shown for values
    pub precision: u32,
    pub title: String,
}

impl Default for PopoverOptions {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            precision: 1,
            title: "High-tide flooding (days)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub filename_prefix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            width: 1440,
            height: 720,
            filename_prefix: "high_tide_flooding_".to_string(),
        }
    }
}

impl ExportOptions {
    pub fn filename(&self, station: &Station) -> String {
        format!("{}{}.{}", self.filename_prefix, station, self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = WidgetOptions::default();
        assert!(options.responsive);
        assert_eq!(options.scale, Scale::Full);
        assert_eq!(options.popover.debounce_ms, 10);
        assert_eq!(options.data.cache_policy, CachePolicy::Unbounded);
        assert!(options.station().is_none());
        assert!(OptionsValidator::validate(&options).is_ok());
    }

    #[test]
    fn test_from_overrides_deep_merges() {
        let options = WidgetOptions::from_overrides(json!({
            "station": "8454000",
            "scale": "historical",
            "layout": { "yaxis": { "title": { "text": "Days" } } },
            "data": { "cache_policy": { "type": "lru", "capacity": 4 } }
        }))
        .unwrap();

        assert_eq!(options.station().unwrap().as_str(), "8454000");
        assert_eq!(options.scale, Scale::Historical);
        assert_eq!(options.layout["yaxis"]["title"]["text"], "Days");
        // untouched siblings survive the merge
        assert_eq!(options.layout["yaxis"]["title"]["font"]["size"], 12);
        assert_eq!(options.layout["xaxis"]["nticks"], 15);
        assert_eq!(options.data.cache_policy, CachePolicy::Lru { capacity: 4 });
        assert_eq!(options.data.historical_url, DEFAULT_HISTORICAL_URL);
    }

    #[test]
    fn test_empty_station_is_none() {
        let options = WidgetOptions::from_overrides(json!({ "station": "" })).unwrap();
        assert!(options.station().is_none());
    }

    #[test]
    fn test_export_filename() {
        let export = ExportOptions::default();
        assert_eq!(
            export.filename(&Station::new("8454000")),
            "high_tide_flooding_8454000.png"
        );
    }
}
