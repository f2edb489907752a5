//! votesort-providers — dataset sources and configuration.
//!
//! Implements the `DataProvider` trait for data files on disk (fixed path or
//! one file per day) and for in-memory records, and loads `votesort.toml`.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;

pub use config::{create_provider, load_config, load_config_from, VotesortConfig};
pub use error::DataError;
pub use file::{DatedFileProvider, FileProvider};
pub use memory::MemoryProvider;
