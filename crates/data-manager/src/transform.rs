//! Turns a station's raw payloads into year-aligned chart series.
//!
//! The transform is pure: the same payloads, year range and current year
//! always give the same `SeriesSet`.

use shared_types::{
    Clock, FloodSeverity, RawStationData, SeriesSet, WidgetError, WidgetResult, YearRange,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    pub years: YearRange,
    /// First year that takes a projection value
    pub current_year: i32,
    pub severity: FloodSeverity,
}

impl TransformOptions {
    pub fn new(years: YearRange, clock: &dyn Clock, severity: FloodSeverity) -> Self {
        Self {
            years,
            current_year: clock.current_year(),
            severity,
        }
    }
}

pub fn build_series(data: &RawStationData, options: &TransformOptions) -> WidgetResult<SeriesSet> {
    let range = options.years;
    if range.is_empty() {
        return Err(WidgetError::invalid_config(
            "years",
            format!("empty year range {}..={}", range.start, range.end),
        ));
    }

    let years: Vec<i32> = range.iter().collect();
    let (historical, historical_max) = historical_series(data, range, options.severity);
    let (lower, higher) = projection_series(data, range, options.current_year)?;

    Ok(SeriesSet {
        range,
        years,
        historical,
        lower,
        higher,
        historical_max,
    })
}

fn historical_series(
    data: &RawStationData,
    range: YearRange,
    severity: FloodSeverity,
) -> (Vec<Option<f64>>, Option<f64>) {
    let mut values = vec![None; range.len()];
    let mut max: Option<f64> = None;

    for record in &data.floods_historical.annual_flood_count {
        let Some(idx) = range.index_of(record.year) else {
            log::trace!("Skipping observed year {} outside {}..={}", record.year, range.start, range.end);
            continue;
        };
        let value = record.count(severity).filter(|v| v.is_finite());
        if let Some(v) = value {
            max = Some(max.map_or(v, |m| m.max(v)));
        }
        values[idx] = value;
    }

    (values, max)
}

fn projection_series(
    data: &RawStationData,
    range: YearRange,
    cutoff: i32,
) -> WidgetResult<(Vec<Option<f64>>, Vec<Option<f64>>)> {
    let entries = &data.projection.annual_projection;
    let needed = range.iter().filter(|year| *year >= cutoff).count();
    if entries.len() < needed {
        return Err(WidgetError::data_shape(format!(
            "projection has {} entries but {needed} years from {cutoff} through {} need one",
            entries.len(),
            range.end
        )));
    }

    let mut lower = Vec::with_capacity(range.len());
    let mut higher = Vec::with_capacity(range.len());
    let mut projected = entries.iter();

    for year in range.iter() {
        let entry = if year >= cutoff { projected.next() } else { None };
        match entry {
            Some(entry) => {
                lower.push(entry.int_low);
                higher.push(entry.intermediate);
            }
            None => {
                lower.push(None);
                higher.push(None);
            }
        }
    }

    Ok((lower, higher))
}
