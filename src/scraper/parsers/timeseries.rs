//! Parser for the USGS instantaneous values JSON (WaterML-JSON) response.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{LakeLevelsError, Result};
use crate::types::Lake;

/// Gage height readings of one lake, keyed by UTC instant
pub type Readings = BTreeMap<DateTime<Utc>, f64>;

/// Parse the time-series response into per-lake gage heights.
///
/// Only the first `values` block of each series is read. Every series is
/// taken as gage height, which the `parameterCd` of the request guarantees.
pub fn parse_timeseries_json(json: &str) -> Result<BTreeMap<Lake, Readings>> {
    let response: TimeSeriesResponse = serde_json::from_str(json)?;
    let mut lakes = BTreeMap::new();

    for series in response.value.time_series {
        let lake = Lake::from_site_name(&series.source_info.site_name)?;
        let points = series
            .values
            .into_iter()
            .next()
            .map(|block| block.value)
            .unwrap_or_default();

        let times = points
            .iter()
            .filter_map(|p| p.date_time.as_deref())
            .map(parse_instant)
            .collect::<Result<Vec<_>>>()?;
        let gage_heights = points
            .iter()
            .filter_map(|p| p.value.as_deref())
            .map(|v| parse_height(lake, v))
            .collect::<Result<Vec<_>>>()?;

        if times.len() != gage_heights.len() {
            return Err(LakeLevelsError::LengthMismatch {
                lake: lake.name().to_string(),
                times: times.len(),
                values: gage_heights.len(),
            });
        }

        let readings: &mut Readings = lakes.entry(lake).or_default();
        readings.extend(times.into_iter().zip(gage_heights));
    }

    Ok(lakes)
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| LakeLevelsError::Parse(format!("bad dateTime {:?}: {}", s, e)))
}

fn parse_height(lake: Lake, s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|e| LakeLevelsError::Parse(format!("bad {} gage height {:?}: {}", lake, s, e)))
}

#[derive(Deserialize)]
struct TimeSeriesResponse {
    value: TimeSeriesCollection,
}

#[derive(Deserialize)]
struct TimeSeriesCollection {
    #[serde(rename = "timeSeries", default)]
    time_series: Vec<TimeSeries>,
}

#[derive(Deserialize)]
struct TimeSeries {
    #[serde(rename = "sourceInfo")]
    source_info: SourceInfo,
    #[serde(default)]
    values: Vec<ValueBlock>,
}

#[derive(Deserialize)]
struct SourceInfo {
    #[serde(rename = "siteName")]
    site_name: String,
}

#[derive(Deserialize)]
struct ValueBlock {
    #[serde(default)]
    value: Vec<Point>,
}

#[derive(Deserialize)]
struct Point {
    value: Option<String>,
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RESPONSE: &str = r#"{
        "name": "ns1:timeSeriesResponseType",
        "value": {
            "queryInfo": {"queryURL": "http://waterservices.usgs.gov/nwis/iv/"},
            "timeSeries": [
                {
                    "sourceInfo": {
                        "siteName": "LAKE MENDOTA AT MADISON, WI",
                        "siteCode": [{"value": "05428000", "agencyCode": "USGS"}]
                    },
                    "variable": {"variableCode": [{"value": "00065"}]},
                    "values": [{
                        "value": [
                            {"value": "9.84", "qualifiers": ["P"], "dateTime": "2018-10-01T00:00:00.000-05:00"},
                            {"value": "9.85", "qualifiers": ["P"], "dateTime": "2018-10-01T00:15:00.000-05:00"}
                        ]
                    }],
                    "name": "USGS:05428000:00065:00000"
                },
                {
                    "sourceInfo": {"siteName": "LAKE MONONA AT MADISON, WI"},
                    "values": [{
                        "value": [
                            {"value": "4.21", "qualifiers": ["P"], "dateTime": "2018-10-01T00:15:00.000-05:00"}
                        ]
                    }]
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_timeseries() {
        let lakes = parse_timeseries_json(RESPONSE).unwrap();
        assert_eq!(lakes.len(), 2);

        let mendota = &lakes[&Lake::Mendota];
        assert_eq!(mendota.len(), 2);
        let first = Utc.with_ymd_and_hms(2018, 10, 1, 5, 0, 0).unwrap();
        assert_eq!(mendota.get(&first), Some(&9.84));

        let monona = &lakes[&Lake::Monona];
        let t = Utc.with_ymd_and_hms(2018, 10, 1, 5, 15, 0).unwrap();
        assert_eq!(monona.get(&t), Some(&4.21));
    }

    #[test]
    fn test_length_mismatch() {
        let json = r#"{"value": {"timeSeries": [{
            "sourceInfo": {"siteName": "LAKE WAUBESA AT MCFARLAND, WI"},
            "values": [{"value": [
                {"value": "3.1", "dateTime": "2018-10-01T00:00:00.000-05:00"},
                {"dateTime": "2018-10-01T00:15:00.000-05:00"}
            ]}]
        }]}}"#;

        match parse_timeseries_json(json) {
            Err(LakeLevelsError::LengthMismatch { lake, times, values }) => {
                assert_eq!(lake, "waubesa");
                assert_eq!(times, 2);
                assert_eq!(values, 1);
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_site_name() {
        let json = r#"{"value": {"timeSeries": [{
            "sourceInfo": {"siteName": "YAHARA RIVER AT MCFARLAND, WI"},
            "values": [{"value": []}]
        }]}}"#;
        assert!(matches!(parse_timeseries_json(json), Err(LakeLevelsError::Parse(_))));
    }

    #[test]
    fn test_bad_value() {
        let json = r#"{"value": {"timeSeries": [{
            "sourceInfo": {"siteName": "LAKE KEGONSA NEAR STOUGHTON, WI"},
            "values": [{"value": [{"value": "Ice", "dateTime": "2018-10-01T00:00:00.000-05:00"}]}]
        }]}}"#;
        assert!(matches!(parse_timeseries_json(json), Err(LakeLevelsError::Parse(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_timeseries_json("<html>503</html>"),
            Err(LakeLevelsError::Json(_))
        ));
    }

    #[test]
    fn test_no_series() {
        let lakes = parse_timeseries_json(r#"{"value": {"timeSeries": []}}"#).unwrap();
        assert!(lakes.is_empty());
    }
}
