//! Parser for the USGS site service RDB (tab-separated) response.
//!
//! RDB layout: `#` comment lines, a header row, a column-format row
//! (e.g. `5s 15s 50s`, tab separated), then one row per site.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{LakeLevelsError, Result};
use crate::types::Lake;

/// Parse the site metadata into each lake's datum elevation (feet)
pub fn parse_site_datum_tsv(rdb: &str) -> Result<BTreeMap<Lake, f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdb.as_bytes());

    if reader.headers()?.is_empty() {
        return Err(LakeLevelsError::Parse("empty site response".to_string()));
    }

    let mut datums = BTreeMap::new();
    // First record is the column-format row, not data
    for row in reader.deserialize::<SiteRow>().skip(1) {
        let row = row?;
        let lake = Lake::from_site_name(&row.station_nm)?;
        let elevation = row.alt_va.parse::<f64>().map_err(|e| {
            LakeLevelsError::Parse(format!("bad {} datum {:?}: {}", lake, row.alt_va, e))
        })?;
        datums.insert(lake, elevation);
    }

    Ok(datums)
}

#[derive(Deserialize)]
struct SiteRow {
    station_nm: String,
    alt_va: String,
}
