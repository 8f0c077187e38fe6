//! Raw payloads returned by the high-tide-flooding API

use serde::{Deserialize, Serialize};

/// Which flood-day count of the historical payload is charted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FloodSeverity {
    #[default]
    Minor,
    Moderate,
    Major,
}

/// One observed year of flood-day counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualFloodCount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stn_name: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub min_count: Option<f64>,
    #[serde(default)]
    pub mod_count: Option<f64>,
    #[serde(default)]
    pub maj_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nan_count: Option<f64>,
}

impl AnnualFloodCount {
    pub fn count(&self, severity: FloodSeverity) -> Option<f64> {
        match severity {
            FloodSeverity::Minor => self.min_count,
            FloodSeverity::Moderate => self.mod_count,
            FloodSeverity::Major => self.maj_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPayload {
    #[serde(rename = "AnnualFloodCount")]
    pub annual_flood_count: Vec<AnnualFloodCount>,
}

/// One projected year; the entries are consumed in array order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualProjection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    /// Lower emissions scenario
    #[serde(default)]
    pub int_low: Option<f64>,
    /// Higher emissions scenario
    #[serde(default)]
    pub intermediate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPayload {
    #[serde(rename = "AnnualProjection")]
    pub annual_projection: Vec<AnnualProjection>,
}

/// Both payloads for one station, exactly as fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStationData {
    pub floods_historical: HistoricalPayload,
    pub projection: ProjectionPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_historical_payload() {
        let json = r#"{"AnnualFloodCount":[
            {"stnId":"8454000","stnName":"Providence","year":1950,"majCount":0,"modCount":1,"minCount":4,"nanCount":0},
            {"stnId":"8454000","stnName":"Providence","year":1951,"majCount":null,"modCount":0,"minCount":2}
        ]}"#;
        let payload: HistoricalPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.annual_flood_count.len(), 2);
        assert_eq!(payload.annual_flood_count[0].count(FloodSeverity::Minor), Some(4.0));
        assert_eq!(payload.annual_flood_count[0].count(FloodSeverity::Moderate), Some(1.0));
        assert_eq!(payload.annual_flood_count[1].count(FloodSeverity::Major), None);
    }

    #[test]
    fn test_missing_top_level_array_is_rejected() {
        let result = serde_json::from_str::<ProjectionPayload>(r#"{"Projection":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_projection_payload() {
        let json = r#"{"AnnualProjection":[{"stnId":"8454000","projectYear":2024,"low":1,"intLow":3.5,"intermediate":6.25,"intHigh":9,"high":12}]}"#;
        let payload: ProjectionPayload = serde_json::from_str(json).unwrap();
        let entry = &payload.annual_projection[0];
        assert_eq!(entry.int_low, Some(3.5));
        assert_eq!(entry.intermediate, Some(6.25));
        assert_eq!(entry.project_year, Some(2024));
    }
}
