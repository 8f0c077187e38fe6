//! Chart description handed to the render sink.
//!
//! Three traces share the year labels: the observed counts as bars on the
//! overlaid `y2` axis, and the two projections as filled lines.

use config_system::{layout, rgba, ColorPalette, ScaleRanges, WidgetOptions};
use serde::Serialize;
use serde_json::Value;
use shared_types::{Scale, SeriesSet, WidgetResult};

const PERIOD: &str = "M12";
const PERIOD_ALIGNMENT: &str = "start";
const FILL: &str = "tonexty";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: String,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverLabel {
    pub namelength: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub trace_type: Option<&'static str>,
    pub x: Vec<String>,
    /// `None` serializes to `null`, drawn as a gap
    pub y: Vec<Option<f64>>,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    pub fill: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    pub xperiod: &'static str,
    pub xperiodalignment: &'static str,
    pub hovertemplate: String,
    pub hoverlabel: HoverLabel,
}

impl Trace {
    fn historical(labels: Vec<String>, series: &SeriesSet, colors: &ColorPalette) -> Trace {
        Trace {
            trace_type: Some("bar"),
            x: labels,
            y: series.historical.clone(),
            name: "Historical",
            mode: None,
            fill: FILL,
            fillcolor: None,
            yaxis: Some("y2"),
            marker: Some(Marker {
                color: colors.hist.outer_band.clone(),
                line: LineStyle {
                    color: colors.hist.bar.clone(),
                    width: 1.5,
                },
            }),
            line: None,
            xperiod: PERIOD,
            xperiodalignment: PERIOD_ALIGNMENT,
            hovertemplate: "Historical: <b>%{y}</b>".to_string(),
            hoverlabel: HoverLabel { namelength: 0 },
        }
    }

    fn projection(
        name: &'static str,
        labels: Vec<String>,
        values: &[Option<f64>],
        outer_band: &str,
        line: &str,
        opacity: f64,
    ) -> WidgetResult<Trace> {
        Ok(Trace {
            trace_type: None,
            x: labels,
            y: values.to_vec(),
            name,
            mode: Some("lines"),
            fill: FILL,
            fillcolor: Some(rgba(outer_band, opacity)?),
            yaxis: None,
            marker: None,
            line: Some(LineStyle {
                color: line.to_string(),
                width: 2.0,
            }),
            xperiod: PERIOD,
            xperiodalignment: PERIOD_ALIGNMENT,
            hovertemplate: format!("{name}: <b>%{{y}}</b>"),
            hoverlabel: HoverLabel { namelength: 0 },
        })
    }
}

/// Traces, layout and chart config for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Value,
    pub config: Value,
}

impl ChartSpec {
    pub fn build(
        series: &SeriesSet,
        options: &WidgetOptions,
        scale: Scale,
        current_year: i32,
    ) -> WidgetResult<ChartSpec> {
        let labels = series.labels();
        let colors = &options.colors;
        let opacity = colors.opacity.ann_proj_minmax;

        let data = vec![
            Trace::historical(labels.clone(), series, colors),
            Trace::projection(
                "Lower Emissions",
                labels.clone(),
                &series.lower,
                &colors.rcp45.outer_band,
                &colors.rcp45.line,
                opacity,
            )?,
            Trace::projection(
                "Higher Emissions",
                labels,
                &series.higher,
                &colors.rcp85.outer_band,
                &colors.rcp85.line,
                opacity,
            )?,
        ];

        let ranges = ScaleRanges::for_scale(scale, current_year, series.historical_axis_max());
        let layout = layout::render_layout(&options.layout, &ranges);

        let mut config = options.config.clone();
        if let Value::Object(map) = &mut config {
            map.insert("responsive".to_string(), Value::Bool(options.responsive));
        }

        Ok(ChartSpec {
            data,
            layout,
            config,
        })
    }

    pub fn to_json(&self) -> WidgetResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::YearRange;

    fn series() -> SeriesSet {
        let range = YearRange::new(2022, 2025);
        SeriesSet {
            range,
            years: range.iter().collect(),
            historical: vec![Some(3.0), Some(7.0), None, None],
            lower: vec![None, None, Some(10.0), Some(11.0)],
            higher: vec![None, None, Some(12.0), Some(15.0)],
            historical_max: Some(7.0),
        }
    }

    #[test]
    fn test_traces() {
        let spec = ChartSpec::build(&series(), &WidgetOptions::default(), Scale::Full, 2024).unwrap();
        let json = spec.to_json().unwrap();

        assert_eq!(json["data"][0]["type"], "bar");
        assert_eq!(json["data"][0]["yaxis"], "y2");
        assert_eq!(json["data"][0]["marker"]["line"]["color"], "rgb(119,119,119)");
        assert_eq!(json["data"][0]["y"][2], Value::Null);
        assert_eq!(json["data"][1]["name"], "Lower Emissions");
        assert_eq!(json["data"][1]["fillcolor"], "rgba(0,88,207,0.5)");
        assert_eq!(json["data"][2]["fillcolor"], "rgba(246,86,66,0.5)");
        assert_eq!(json["data"][2]["hovertemplate"], "Higher Emissions: <b>%{y}</b>");
        assert!(json["data"][1].get("type").is_none());
        assert_eq!(json["data"][1]["x"][0], "2022-01-01");
    }

    #[test]
    fn test_layout_follows_scale() {
        let options = WidgetOptions::default();
        let full = ChartSpec::build(&series(), &options, Scale::Full, 2024).unwrap();
        let historical = ChartSpec::build(&series(), &options, Scale::Historical, 2024).unwrap();

        assert_eq!(full.layout["yaxis"]["range"][1], 365.0);
        assert_eq!(historical.layout["yaxis"]["range"][1], 14.0);
        assert_eq!(historical.layout["xaxis"]["range"][1], "2024-01-01");
        assert_eq!(full.config["displaylogo"], false);
        assert_eq!(full.config["responsive"], true);
    }
}
