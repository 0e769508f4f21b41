//! SQLite storage for lake levels
//!
//! A single `levels` table keyed by timestamp, one nullable REAL column per lake.

pub mod repository;
pub mod schema;

pub use repository::LevelStore;
pub use schema::create_tables;
