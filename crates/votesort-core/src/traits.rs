//! The data-provider seam.
//!
//! Implemented by the `votesort-providers` crate.

use async_trait::async_trait;

use crate::dataset::RawRecord;

/// A source of raw question/answer records.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Human-readable provider name (e.g. "file").
    fn name(&self) -> &str;

    /// Load every record. Fails if nothing is available.
    async fn load(&self) -> anyhow::Result<Vec<RawRecord>>;
}
