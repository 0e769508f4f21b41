//! Lake identifiers and the fixed-schema level table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LakeLevelsError, Result};

/// The four Madison lakes monitored by USGS
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lake {
    Mendota,
    Monona,
    Waubesa,
    Kegonsa,
}

impl Lake {
    /// All lakes in column order
    pub const ALL: [Lake; 4] = [Lake::Mendota, Lake::Monona, Lake::Waubesa, Lake::Kegonsa];

    /// Column name used in tables and the database
    pub fn name(&self) -> &'static str {
        match self {
            Lake::Mendota => "mendota",
            Lake::Monona => "monona",
            Lake::Waubesa => "waubesa",
            Lake::Kegonsa => "kegonsa",
        }
    }

    /// USGS site number
    /// See https://waterdata.usgs.gov/wi/nwis/current/?type=dane&group_key=NONE
    pub fn site_number(&self) -> &'static str {
        match self {
            Lake::Mendota => "05428000",
            Lake::Monona => "05429000",
            Lake::Waubesa => "05429485",
            Lake::Kegonsa => "425715089164700",
        }
    }

    /// Resolve a USGS station name such as "LAKE MENDOTA AT MADISON, WI".
    ///
    /// The lake is the second whitespace-separated word.
    pub fn from_site_name(site_name: &str) -> Result<Self> {
        let word = site_name.split_whitespace().nth(1).ok_or_else(|| {
            LakeLevelsError::Parse(format!("unexpected site name: {:?}", site_name))
        })?;
        word.parse()
    }
}

impl fmt::Display for Lake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lake {
    type Err = LakeLevelsError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        Lake::ALL
            .into_iter()
            .find(|lake| lake.name() == lower)
            .ok_or_else(|| LakeLevelsError::Parse(format!("unknown lake: {:?}", s)))
    }
}

/// Lake heights (feet, gage height + datum elevation) at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LakeLevels {
    pub timestamp: DateTime<Utc>,
    pub mendota: Option<f64>,
    pub monona: Option<f64>,
    pub waubesa: Option<f64>,
    pub kegonsa: Option<f64>,
}

impl LakeLevels {
    /// Row with no readings
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            mendota: None,
            monona: None,
            waubesa: None,
            kegonsa: None,
        }
    }

    pub fn get(&self, lake: Lake) -> Option<f64> {
        match lake {
            Lake::Mendota => self.mendota,
            Lake::Monona => self.monona,
            Lake::Waubesa => self.waubesa,
            Lake::Kegonsa => self.kegonsa,
        }
    }

    pub fn set(&mut self, lake: Lake, height: Option<f64>) {
        match lake {
            Lake::Mendota => self.mendota = height,
            Lake::Monona => self.monona = height,
            Lake::Waubesa => self.waubesa = height,
            Lake::Kegonsa => self.kegonsa = height,
        }
    }
}

/// Rows ordered by timestamp, one per distinct instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTable {
    rows: Vec<LakeLevels>,
}

impl LevelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from unordered rows.
    ///
    /// Fails if two rows share a timestamp.
    pub fn from_rows(mut rows: Vec<LakeLevels>) -> Result<Self> {
        rows.sort_by_key(|row| row.timestamp);
        if let Some(pair) = rows.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(LakeLevelsError::InvalidArgument(format!(
                "duplicate timestamp {} in table",
                pair[0].timestamp
            )));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[LakeLevels] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &LakeLevels> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at exactly this instant
    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<&LakeLevels> {
        self.rows
            .binary_search_by_key(timestamp, |row| row.timestamp)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn first(&self) -> Option<&LakeLevels> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&LakeLevels> {
        self.rows.last()
    }

    /// Drop every row at or before `instant`
    pub fn retain_after(&mut self, instant: DateTime<Utc>) {
        self.rows.retain(|row| row.timestamp > instant);
    }

    /// Keep rows in `[start, end]`; without `end` everything from `start` on
    pub fn retain_within(&mut self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) {
        self.rows
            .retain(|row| row.timestamp >= start && end.map_or(true, |end| row.timestamp <= end));
    }
}

impl IntoIterator for LevelTable {
    type Item = LakeLevels;
    type IntoIter = std::vec::IntoIter<LakeLevels>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a LevelTable {
    type Item = &'a LakeLevels;
    type IntoIter = std::slice::Iter<'a, LakeLevels>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
