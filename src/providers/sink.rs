// =============================================================================
// Result sinks — per-date upsert of analysis results
// =============================================================================
//
// JsonDirectorySink stores one `<YYYY-MM-DD>.json` file per analysis date.
// Writes use an atomic tmp + rename so a crash mid-write never leaves a
// half-written result file behind. Saving the same date twice replaces the
// previous results.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::info;

use crate::analysis::AnalysisResult;
use crate::error::SinkError;
use crate::providers::ResultSink;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct JsonDirectorySink {
    dir: PathBuf,
}

impl JsonDirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format(DATE_FORMAT)))
    }
}

#[async_trait]
impl ResultSink for JsonDirectorySink {
    async fn save(&self, date: NaiveDate, results: &[AnalysisResult]) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let content = serde_json::to_string_pretty(results)?;
        let path = self.path_for(date);
        let tmp_path = path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        info!(path = %path.display(), results = results.len(), "analysis results saved (atomic)");
        Ok(())
    }

    async fn load(&self, date: NaiveDate) -> Result<Option<Vec<AnalysisResult>>, SinkError> {
        let path = self.path_for(date);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn dates(&self) -> Result<Vec<NaiveDate>, SinkError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(date) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }
}

/// In-process sink; results live as long as the process.
#[derive(Debug, Default)]
pub struct MemorySink {
    results: RwLock<BTreeMap<NaiveDate, Vec<AnalysisResult>>>,
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn save(&self, date: NaiveDate, results: &[AnalysisResult]) -> Result<(), SinkError> {
        self.results.write().insert(date, results.to_vec());
        Ok(())
    }

    async fn load(&self, date: NaiveDate) -> Result<Option<Vec<AnalysisResult>>, SinkError> {
        Ok(self.results.read().get(&date).cloned())
    }

    async fn dates(&self) -> Result<Vec<NaiveDate>, SinkError> {
        Ok(self.results.read().keys().copied().collect())
    }
}
