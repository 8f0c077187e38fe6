//! Chart layout per scale.
//!
//! The base layout from the options is never mutated. Each render derives a
//! fresh layout from `(scale, base)`, so switching scales back and forth
//! always lands on the same axes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use shared_types::series::year_label;
use shared_types::Scale;

/// First year shown on both scales
pub const FIRST_CHARTED_YEAR: i32 = 1950;
/// Last year shown on the full scale
pub const LAST_PROJECTED_YEAR: i32 = 2100;
/// Upper y bound of the full scale: every day of the year
pub const FULL_SCALE_Y_MAX: f64 = 365.0;

const FULL_SCALE_Y_DTICK: f64 = 75.0;
const HISTORICAL_SCALE_Y_DTICK: f64 = 5.0;

/// Axis ranges and tick spacing for one scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRanges {
    pub x_range: [i32; 2],
    pub y_range: [f64; 2],
    pub y_dtick: f64,
}

impl ScaleRanges {
    /// `historical_y_max` is the headroom-adjusted bound computed from the
    /// station's observations.
    pub fn for_scale(scale: Scale, current_year: i32, historical_y_max: f64) -> Self {
        match scale {
            Scale::Full => Self {
                x_range: [FIRST_CHARTED_YEAR, LAST_PROJECTED_YEAR],
                y_range: [0.0, FULL_SCALE_Y_MAX],
                y_dtick: FULL_SCALE_Y_DTICK,
            },
            Scale::Historical => Self {
                x_range: [FIRST_CHARTED_YEAR, current_year],
                y_range: [0.0, historical_y_max],
                y_dtick: HISTORICAL_SCALE_Y_DTICK,
            },
        }
    }
}

/// The base layout with the scale's ranges written into its axes
pub fn render_layout(base: &Value, ranges: &ScaleRanges) -> Value {
    let mut layout = as_object(base.clone());

    let xaxis = object_entry(&mut layout, "xaxis");
    xaxis.insert(
        "range".to_string(),
        json!([year_label(ranges.x_range[0]), year_label(ranges.x_range[1])]),
    );

    let yaxis = object_entry(&mut layout, "yaxis");
    yaxis.insert("range".to_string(), json!(ranges.y_range));
    yaxis.insert("dtick".to_string(), json!(ranges.y_dtick));

    Value::Object(layout)
}

/// Layout used while exporting an image: the y-axis title moves into the
/// chart title and the top margin grows to fit it.
pub fn export_layout(rendered: &Value) -> Value {
    let mut layout = as_object(rendered.clone());

    let yaxis = object_entry(&mut layout, "yaxis");
    let mut title = as_object(yaxis.get("title").cloned().unwrap_or(Value::Null));
    title.insert("x".to_string(), json!(0.015));
    object_entry(yaxis, "title").insert("text".to_string(), json!(""));

    layout.insert("title".to_string(), Value::Object(title));
    layout.insert("margin".to_string(), json!({ "l": 50, "t": 30, "r": 50, "b": 2 }));

    Value::Object(layout)
}

/// The rendered layout restored after an export, with the title cleared
pub fn restore_layout(rendered: &Value) -> Value {
    let mut layout = as_object(rendered.clone());
    layout.insert("title".to_string(), json!(""));
    Value::Object(layout)
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(map) => map,
        _ => unreachable!("entry was just made an object"),
    }
}

pub fn default_layout() -> Value {
    json!({
        "yaxis2": {
            "type": "linear",
            "matches": "y",
            "overlaying": "y",
            "showline": false,
            "showgrid": false,
            "showticklabels": false,
            "nticks": 0
        },
        "xaxis": {
            "nticks": 15,
            "ticks": "outside",
            "linecolor": "rgb(0,0,0)",
            "side": "bottom",
            "tickformat": "%Y",
            "xperiodalignment": "start",
            "type": "date",
            "ticklabelmode": "period",
            "range": [FIRST_CHARTED_YEAR, LAST_PROJECTED_YEAR]
        },
        "yaxis": {
            "tickmode": "linear",
            "tick0": 0,
            "dtick": FULL_SCALE_Y_DTICK,
            "ticks": "outside",
            "side": "left",
            "linecolor": "rgb(0,0,0)",
            "title": {
                "text": "Annual Days with High-Tide Flooding",
                "font": { "size": 12, "color": "#494949" }
            },
            "range": [0, FULL_SCALE_Y_MAX]
        },
        "legend": { "orientation": "h" },
        "hovermode": "x unified",
        "hoverdistance": 30,
        "autosize": true,
        "margin": { "l": 50, "t": 2, "r": 50, "b": 2 }
    })
}

pub fn default_chart_config() -> Value {
    json!({
        "responsive": true,
        "displaylogo": false,
        "modeBarButtonsToRemove": ["toImage", "lasso2d", "select2d", "resetScale2d"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scale_ranges() {
        let ranges = ScaleRanges::for_scale(Scale::Full, 2024, 40.0);
        assert_eq!(ranges.x_range, [1950, 2100]);
        assert_eq!(ranges.y_range, [0.0, 365.0]);
        assert_eq!(ranges.y_dtick, 75.0);
    }

    #[test]
    fn test_historical_scale_ranges() {
        let ranges = ScaleRanges::for_scale(Scale::Historical, 2024, 40.0);
        assert_eq!(ranges.x_range, [1950, 2024]);
        assert_eq!(ranges.y_range, [0.0, 40.0]);
        assert_eq!(ranges.y_dtick, 5.0);
    }

    #[test]
    fn test_render_layout_leaves_base_untouched() {
        let base = default_layout();
        let layout = render_layout(&base, &ScaleRanges::for_scale(Scale::Historical, 2024, 40.0));

        assert_eq!(layout["xaxis"]["range"], json!(["1950-01-01", "2024-01-01"]));
        assert_eq!(layout["yaxis"]["range"], json!([0.0, 40.0]));
        assert_eq!(layout["yaxis"]["dtick"], json!(5.0));
        assert_eq!(layout["xaxis"]["nticks"], 15);
        assert_eq!(base["xaxis"]["range"], json!([1950, 2100]));
    }

    #[test]
    fn test_scale_round_trip_restores_axes() {
        let base = default_layout();
        let full = render_layout(&base, &ScaleRanges::for_scale(Scale::Full, 2024, 40.0));
        let historical = render_layout(&base, &ScaleRanges::for_scale(Scale::Historical, 2024, 40.0));
        let back = render_layout(&base, &ScaleRanges::for_scale(Scale::Full, 2024, 40.0));

        assert_ne!(full, historical);
        assert_eq!(full, back);
    }

    #[test]
    fn test_export_layout_moves_title() {
        let rendered = render_layout(&default_layout(), &ScaleRanges::for_scale(Scale::Full, 2024, 40.0));
        let export = export_layout(&rendered);

        assert_eq!(export["title"]["text"], "Annual Days with High-Tide Flooding");
        assert_eq!(export["title"]["x"], 0.015);
        assert_eq!(export["title"]["font"]["size"], 12);
        assert_eq!(export["yaxis"]["title"]["text"], "");
        assert_eq!(export["margin"]["t"], 30);
        assert_eq!(restore_layout(&rendered)["title"], "");
    }

    #[test]
    fn test_render_layout_repairs_non_object_axes() {
        let base = json!({ "xaxis": 3 });
        let layout = render_layout(&base, &ScaleRanges::for_scale(Scale::Full, 2024, 40.0));
        assert!(layout["xaxis"].is_object());
        assert_eq!(layout["yaxis"]["dtick"], json!(75.0));
    }
}
