//! Year-aligned series derived from a station's payloads

use serde::{Deserialize, Serialize};

use crate::YearRange;

/// Upper bound of the historical y axis when nothing positive was observed
pub const DEFAULT_HISTORICAL_Y_MAX: f64 = 365.0;

/// Parallel sequences indexed by year.
///
/// `None` is the "no data" marker; it serializes to `null`, which the chart
/// draws as a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSet {
    pub range: YearRange,
    pub years: Vec<i32>,
    pub historical: Vec<Option<f64>>,
    /// Lower emissions projection
    pub lower: Vec<Option<f64>>,
    /// Higher emissions projection
    pub higher: Vec<Option<f64>>,
    /// Largest observed historical value, if any was present
    pub historical_max: Option<f64>,
}

impl SeriesSet {
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn index_of(&self, year: i32) -> Option<usize> {
        self.range.index_of(year).filter(|&idx| idx < self.years.len())
    }

    /// x-axis labels, one `YYYY-01-01` date per year
    pub fn labels(&self) -> Vec<String> {
        self.years.iter().map(|year| year_label(*year)).collect()
    }

    /// Twice the largest observation so the secondary axis has headroom
    pub fn historical_axis_max(&self) -> f64 {
        match self.historical_max {
            Some(max) if max.is_finite() && max > 0.0 => max * 2.0,
            _ => DEFAULT_HISTORICAL_Y_MAX,
        }
    }
}

pub fn year_label(year: i32) -> String {
    format!("{year:04}-01-01")
}
