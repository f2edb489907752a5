//! In-memory provider, for tests and embedding.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use votesort_core::dataset::{parse_records, RawRecord};
use votesort_core::traits::DataProvider;
use votesort_core::EngineError;

use crate::error::DataError;

/// Serves a fixed set of records.
pub struct MemoryProvider {
    records: Vec<RawRecord>,
    load_count: AtomicU32,
}

impl MemoryProvider {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            load_count: AtomicU32::new(0),
        }
    }

    /// Parse records from a JSON or script-wrapped string.
    pub fn from_text(content: &str) -> Result<Self, EngineError> {
        Ok(Self::new(parse_records(content)?))
    }

    /// Number of times `load` was called.
    pub fn load_count(&self) -> u32 {
        self.load_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DataProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> anyhow::Result<Vec<RawRecord>> {
        self.load_count.fetch_add(1, Ordering::Relaxed);
        if self.records.is_empty() {
            return Err(DataError::Empty.into());
        }
        Ok(self.records.clone())
    }
}
