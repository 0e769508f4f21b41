//! Madison lake levels
//!
//! Fetches water levels of Lakes Mendota, Monona, Waubesa and Kegonsa from
//! the USGS water services and stores them in a local SQLite table.
//!
//! ```no_run
//! use lake_levels::{fetch, LevelStore};
//! use std::path::Path;
//!
//! let latest = fetch(None, None)?;
//! let mut store = LevelStore::open(Path::new("lake_levels.db"))?;
//! store.insert(&latest)?;
//! # Ok::<(), lake_levels::LakeLevelsError>(())
//! ```

pub mod config;
pub mod error;
pub mod scraper;
pub mod storage;
pub mod types;

pub use error::{LakeLevelsError, Result};
pub use scraper::{fetch, UsgsClient};
pub use storage::LevelStore;
pub use types::{Lake, LakeLevels, LevelTable};
