//! JSON and RDB parsers for USGS water services responses.

pub mod site_datum;
pub mod timeseries;

pub use site_datum::parse_site_datum_tsv;
pub use timeseries::{parse_timeseries_json, Readings};
