//! Color palette for the three traces and the popover.
//!
//! Colors are kept as CSS `rgb(...)`/`rgba(...)` strings because they are
//! handed to the chart and the stylesheet verbatim.

use serde::{Deserialize, Serialize};
use shared_types::{WidgetError, WidgetResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Lower emissions
    pub rcp45: BandColors,
    /// Higher emissions
    pub rcp85: BandColors,
    pub hist: HistoricalColors,
    pub opacity: Opacity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandColors {
    #[serde(rename = "outerBand")]
    pub outer_band: String,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalColors {
    #[serde(rename = "outerBand")]
    pub outer_band: String,
    pub bar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opacity {
    pub ann_hist_minmax: f64,
    pub ann_proj_minmax: f64,
    pub mon_proj_minmax: f64,
    pub hist_obs: f64,
    pub proj_line: f64,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            rcp45: BandColors {
                outer_band: "rgb(0,88,207)".to_string(),
                line: "rgb(0,88,207)".to_string(),
            },
            rcp85: BandColors {
                outer_band: "rgba(246, 86, 66, 0.5)".to_string(),
                line: "rgb(245,68,45)".to_string(),
            },
            hist: HistoricalColors {
                outer_band: "rgba(170,170,170, 0.5)".to_string(),
                bar: "rgb(119,119,119)".to_string(),
            },
            opacity: Opacity {
                ann_hist_minmax: 0.6,
                ann_proj_minmax: 0.5,
                mon_proj_minmax: 0.5,
                hist_obs: 1.0,
                proj_line: 1.0,
            },
        }
    }
}

impl ColorPalette {
    /// Every color string, with its option path, for validation
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("colors.rcp45.outerBand", self.rcp45.outer_band.as_str()),
            ("colors.rcp45.line", self.rcp45.line.as_str()),
            ("colors.rcp85.outerBand", self.rcp85.outer_band.as_str()),
            ("colors.rcp85.line", self.rcp85.line.as_str()),
            ("colors.hist.outerBand", self.hist.outer_band.as_str()),
            ("colors.hist.bar", self.hist.bar.as_str()),
        ]
    }
}

/// The red, green and blue channels of a CSS color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses `rgb(r,g,b)` or `rgba(r,g,b,a)`; any alpha is dropped.
    /// Hex colors are not supported.
    pub fn parse(css: &str) -> WidgetResult<Rgb> {
        let inner = css
            .split_once('(')
            .and_then(|(_, rest)| rest.split_once(')'))
            .map(|(inner, _)| inner)
            .ok_or_else(|| WidgetError::invalid_config("colors", format!("not an rgb color: '{css}'")))?;

        let channels = inner
            .split(',')
            .take(3)
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| WidgetError::invalid_config("colors", format!("bad channel in '{css}': {e}")))?;

        match channels.as_slice() {
            [r, g, b] => Ok(Rgb {
                r: *r,
                g: *g,
                b: *b,
            }),
            _ => Err(WidgetError::invalid_config(
                "colors",
                format!("expected three channels in '{css}'"),
            )),
        }
    }

    pub fn with_alpha(&self, opacity: f64) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, opacity)
    }
}

/// Re-expresses `css` with the given opacity
pub fn rgba(css: &str, opacity: f64) -> WidgetResult<String> {
    Ok(Rgb::parse(css)?.with_alpha(opacity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb_and_rgba() {
        assert_eq!(Rgb::parse("rgb(0,88,207)").unwrap(), Rgb { r: 0, g: 88, b: 207 });
        assert_eq!(
            Rgb::parse("rgba(246, 86, 66, 0.5)").unwrap(),
            Rgb { r: 246, g: 86, b: 66 }
        );
    }

    #[test]
    fn test_rgba_replaces_alpha() {
        assert_eq!(rgba("rgba(246, 86, 66, 0.5)", 0.1).unwrap(), "rgba(246,86,66,0.1)");
        assert_eq!(rgba("rgb(119,119,119)", 0.75).unwrap(), "rgba(119,119,119,0.75)");
    }

    #[test]
    fn test_rejects_hex_and_garbage() {
        assert!(Rgb::parse("#ff0000").is_err());
        assert!(Rgb::parse("rgb(1,2)").is_err());
        assert!(Rgb::parse("rgb(300,0,0)").is_err());
    }

    #[test]
    fn test_default_palette_is_parseable() {
        for (_, color) in ColorPalette::default().entries() {
            assert!(Rgb::parse(color).is_ok(), "{color}");
        }
    }
}
