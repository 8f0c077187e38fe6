//! Popover state and data structures for the per-year detail overlay

use serde::{Deserialize, Serialize};

use crate::errors::{WidgetError, WidgetResult};
use crate::series::SeriesSet;

/// Offset of the plot area from the container's left edge
const PLOT_LEFT_MARGIN: f64 = 50.0;
/// Gap between the pointer and the popover
const POINTER_GAP: f64 = 7.0;
/// Slack kept between the popover and the container's right edge
const RIGHT_SLACK: f64 = 25.0;
/// Height taken by the legend under the plot
const LEGEND_HEIGHT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PopoverMode {
    #[default]
    Hidden,
    /// Follows the pointer, hides when the pointer leaves
    Transient,
    /// Stays put until closed explicitly
    Pinned,
}

/// What the popover says about one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopoverContent {
    Projection {
        year: i32,
        higher: Option<f64>,
        lower: Option<f64>,
    },
    Observed {
        year: i32,
        count: Option<f64>,
    },
}

impl PopoverContent {
    /// Looks `year` up in `series`; the current year and later show the
    /// projections, earlier years show the observation.
    pub fn for_year(
        series: &SeriesSet,
        year: i32,
        current_year: i32,
        precision: u32,
    ) -> WidgetResult<Self> {
        let idx = series.index_of(year).ok_or_else(|| {
            WidgetError::data_shape(format!(
                "year {year} is outside the charted range {}-{}",
                series.range.start, series.range.end
            ))
        })?;

        let content = if year >= current_year {
            PopoverContent::Projection {
                year,
                higher: round_to(series.higher[idx], precision),
                lower: round_to(series.lower[idx], precision),
            }
        } else {
            PopoverContent::Observed {
                year,
                count: round_to(series.historical[idx], precision),
            }
        };
        Ok(content)
    }

    pub fn year(&self) -> i32 {
        match self {
            PopoverContent::Projection { year, .. } | PopoverContent::Observed { year, .. } => {
                *year
            }
        }
    }
}

fn round_to(value: Option<f64>, precision: u32) -> Option<f64> {
    let factor = 10f64.powi(precision as i32);
    value
        .filter(|v| v.is_finite())
        .map(|v| (v * factor).round() / factor)
}

/// Top-left corner of the popover, in container pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopoverPosition {
    pub left: f64,
    pub top: f64,
}

impl PopoverPosition {
    /// Fixed anchor used while pinned
    pub const PINNED_ANCHOR: PopoverPosition = PopoverPosition {
        left: 60.0,
        top: 15.0,
    };
}

/// Measured sizes of the container and the popover node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PopoverGeometry {
    pub container_width: f64,
    pub container_height: f64,
    pub popover_width: f64,
    pub popover_height: f64,
}

impl PopoverGeometry {
    /// Places the popover beside the pointer, flipping to the left side when
    /// it would overflow the container; centred horizontally without a
    /// pointer position and always centred vertically.
    pub fn position_for(&self, pixel_x: Option<f64>) -> PopoverPosition {
        let left = match pixel_x {
            Some(x) => {
                let mut left = x + PLOT_LEFT_MARGIN + POINTER_GAP;
                if left + self.popover_width + RIGHT_SLACK >= self.container_width {
                    left -= self.popover_width + 2.0 * POINTER_GAP;
                }
                left
            }
            None => {
                (self.container_width - PLOT_LEFT_MARGIN) / 2.0 - self.popover_width / 2.0
                    + POINTER_GAP
            }
        };
        let top = (self.container_height - LEGEND_HEIGHT) / 2.0 - self.popover_height / 2.0;

        PopoverPosition { left, top }
    }
}
