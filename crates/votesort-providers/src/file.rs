//! File-backed data providers.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use votesort_core::dataset::{parse_records, RawRecord};
use votesort_core::traits::DataProvider;

use crate::error::DataError;

/// Reads a JSON or script-wrapped data file.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> anyhow::Result<Vec<RawRecord>> {
        if !self.path.exists() {
            return Err(DataError::NotFound(self.path.clone()).into());
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DataError::Read {
                path: self.path.clone(),
                source,
            })?;

        let records = parse_records(&content)?;
        if records.is_empty() {
            return Err(DataError::Empty.into());
        }
        tracing::debug!(
            "loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Reads the data file published for one day: `<dir>/<YYYYMMDD>_data.js`,
/// or the `.json` variant of the same name.
#[derive(Debug, Clone)]
pub struct DatedFileProvider {
    dir: PathBuf,
    date: NaiveDate,
}

impl DatedFileProvider {
    pub fn new(dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            dir: dir.into(),
            date,
        }
    }

    /// Provider for today's file in the local timezone.
    pub fn today(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, chrono::Local::now().date_naive())
    }

    /// Candidate file paths, in lookup order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let stem = self.date.format("%Y%m%d");
        ["js", "json"]
            .iter()
            .map(|ext| self.dir.join(format!("{stem}_data.{ext}")))
            .collect()
    }
}

#[async_trait]
impl DataProvider for DatedFileProvider {
    fn name(&self) -> &str {
        "dated-file"
    }

    async fn load(&self) -> anyhow::Result<Vec<RawRecord>> {
        let Some(path) = self.candidates().into_iter().find(|p| p.exists()) else {
            return Err(DataError::NoDatedFile {
                dir: self.dir.clone(),
                date: self.date.format("%Y-%m-%d").to_string(),
            }
            .into());
        };
        FileProvider::new(path).load().await
    }
}
