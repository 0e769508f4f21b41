//! USGS water services scraper for the Madison lakes.
//!
//! Two requests per fetch: instantaneous gage heights (JSON) and site
//! metadata (RDB) carrying each site's datum elevation. Heights returned
//! are gage height + datum elevation.

pub mod parsers;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::UsgsConfig;
use crate::error::{LakeLevelsError, Result};
use crate::types::{Lake, LakeLevels, LevelTable};

pub use parsers::{parse_site_datum_tsv, parse_timeseries_json, Readings};

/// Date format of the `startDT`/`endDT` parameters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// USGS parameter code for gage height (feet)
pub const GAGE_HEIGHT_PARAMETER: &str = "00065";

/// Comma-joined site numbers of every lake
pub fn sites_param() -> String {
    Lake::ALL
        .iter()
        .map(|lake| lake.site_number())
        .collect::<Vec<_>>()
        .join(",")
}

/// Query for the time-series service.
///
/// Without `start` the service returns the most recent sample only,
/// so `end` requires `start`. Only gage height series are requested.
pub fn timeseries_query(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<(&'static str, String)>> {
    let mut query = vec![
        ("sites", sites_param()),
        ("parameterCd", GAGE_HEIGHT_PARAMETER.to_string()),
        ("format", "json".to_string()),
    ];

    match (start, end) {
        (None, Some(_)) => {
            return Err(LakeLevelsError::InvalidArgument(
                "if start is None, then end must be None too".to_string(),
            ));
        }
        (Some(start), Some(end)) if end < start => {
            return Err(LakeLevelsError::InvalidArgument(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        _ => {}
    }

    if let Some(start) = start {
        query.push(("startDT", start.format(DATE_FORMAT).to_string()));
    }
    if let Some(end) = end {
        query.push(("endDT", end.format(DATE_FORMAT).to_string()));
    }

    Ok(query)
}

/// Query for the site metadata service
pub fn site_query() -> Vec<(&'static str, String)> {
    vec![("sites", sites_param()), ("format", "rdb".to_string())]
}

/// Apply each lake's datum to its gage heights and pivot into one row per instant.
///
/// Datums for lakes without readings are ignored.
pub fn combine(
    series: BTreeMap<Lake, Readings>,
    datums: &BTreeMap<Lake, f64>,
) -> Result<LevelTable> {
    let mut rows: BTreeMap<DateTime<Utc>, LakeLevels> = BTreeMap::new();

    for (lake, readings) in series {
        if readings.is_empty() {
            continue;
        }
        let datum = *datums.get(&lake).ok_or(LakeLevelsError::MissingDatum(lake))?;

        for (timestamp, gage_height) in readings {
            rows.entry(timestamp)
                .or_insert_with(|| LakeLevels::empty(timestamp))
                .set(lake, Some(gage_height + datum));
        }
    }

    LevelTable::from_rows(rows.into_values().collect())
}

/// Blocking client for the USGS water services
pub struct UsgsClient {
    http: Client,
    config: UsgsConfig,
}

impl UsgsClient {
    pub fn new(config: UsgsConfig) -> Result<Self> {
        let http = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self { http, config })
    }

    /// Fetch lake heights with timestamps in `[start, end]`.
    ///
    /// The service selects whole local days, so rows outside the bounds
    /// are dropped here. With neither bound the most recent sample is returned.
    pub fn fetch(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<LevelTable> {
        let query = timeseries_query(start, end)?;

        let json = self.post(&self.config.timeseries_url, &query)?;
        let series = parse_timeseries_json(&json)?;

        let rdb = self.post(&self.config.site_url, &site_query())?;
        let datums = parse_site_datum_tsv(&rdb)?;

        let mut table = combine(series, &datums)?;
        if let Some(start) = start {
            table.retain_within(start, end);
        }
        info!("Fetched {} rows of lake levels", table.len());
        Ok(table)
    }

    fn post(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        debug!("POST {} {:?}", url, query);
        let body = self
            .http
            .post(url)
            .query(query)
            .send()?
            .error_for_status()?
            .text()?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

/// Fetch lake heights from the public USGS services
pub fn fetch(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<LevelTable> {
    UsgsClient::new(UsgsConfig::default())?.fetch(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 10, d, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_sites_param() {
        assert_eq!(sites_param(), "05428000,05429000,05429485,425715089164700");
    }

    #[test]
    fn test_query_latest() {
        let query = timeseries_query(None, None).unwrap();
        assert_eq!(query.len(), 3);
        assert!(query.contains(&("parameterCd", "00065".to_string())));
        assert!(query.contains(&("format", "json".to_string())));
    }

    #[test]
    fn test_query_with_dates() {
        let query = timeseries_query(Some(day(1)), Some(day(3))).unwrap();
        assert!(query.contains(&("startDT", "2018-10-01".to_string())));
        assert!(query.contains(&("endDT", "2018-10-03".to_string())));

        let query = timeseries_query(Some(day(1)), None).unwrap();
        assert!(query.contains(&("startDT", "2018-10-01".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "endDT"));
    }

    #[test]
    fn test_query_end_without_start() {
        for d in [1, 15, 31] {
            assert!(matches!(
                timeseries_query(None, Some(day(d))),
                Err(LakeLevelsError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_query_end_before_start() {
        assert!(matches!(
            timeseries_query(Some(day(3)), Some(day(1))),
            Err(LakeLevelsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_site_query() {
        assert_eq!(site_query()[1], ("format", "rdb".to_string()));
    }

    #[test]
    fn test_combine_adds_datum() {
        let t1 = day(1);
        let t2 = day(2);
        let mut series = BTreeMap::new();
        series.insert(Lake::Mendota, Readings::from([(t1, 9.5), (t2, 9.75)]));
        series.insert(Lake::Kegonsa, Readings::from([(t2, 2.0)]));
        let datums = BTreeMap::from([
            (Lake::Mendota, 840.0),
            (Lake::Kegonsa, 836.5),
            (Lake::Monona, 840.0),
        ]);

        let table = combine(series, &datums).unwrap();
        assert_eq!(table.len(), 2);

        let row1 = table.get(&t1).unwrap();
        assert_eq!(row1.mendota, Some(849.5));
        assert_eq!(row1.kegonsa, None);
        assert_eq!(row1.monona, None);

        let row2 = table.get(&t2).unwrap();
        assert_eq!(row2.mendota, Some(849.75));
        assert_eq!(row2.kegonsa, Some(838.5));
    }

    #[test]
    fn test_combine_missing_datum() {
        let series = BTreeMap::from([(Lake::Waubesa, Readings::from([(day(1), 3.0)]))]);
        assert!(matches!(
            combine(series, &BTreeMap::new()),
            Err(LakeLevelsError::MissingDatum(Lake::Waubesa))
        ));
    }

    #[test]
    fn test_fetch_rejects_end_without_start() {
        // Validation happens before any request, so the unroutable host is never contacted
        let client = UsgsClient::new(UsgsConfig {
            timeseries_url: "http://127.0.0.1:9/nwis/iv/".to_string(),
            site_url: "http://127.0.0.1:9/nwis/site/".to_string(),
            ..UsgsConfig::default()
        })
        .unwrap();
        assert!(matches!(
            client.fetch(None, Some(day(1))),
            Err(LakeLevelsError::InvalidArgument(_))
        ));
    }
}
