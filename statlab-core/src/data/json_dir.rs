//! Directory-backed series source.
//!
//! Layout: `{dir}/{IDENTIFIER}.json`, each file holding
//! `{ "metadata": {...}, "data_points": [...] }`.
//!
//! Files are read when the fetch is issued; the returned future is already
//! resolved.

use super::provider::{
    FetchError, FetchResult, RawDataPoint, SeriesFuture, SeriesMetadata, SeriesSource,
};
use crate::domain::{Identifier, TimeRangeSpec};
use futures::future::{self, FutureExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk shape of one series file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesFile {
    pub metadata: SeriesMetadata,
    #[serde(default)]
    pub data_points: Vec<RawDataPoint>,
}

/// Source reading one JSON file per identifier from a directory.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `id`, or `None` if the identifier could
    /// escape the directory.
    fn series_path(&self, id: &Identifier) -> Option<PathBuf> {
        let raw = id.as_str();
        if raw.is_empty() || raw.contains(['/', '\\']) || raw.starts_with('.') {
            return None;
        }
        Some(self.dir.join(format!("{raw}.json")))
    }

    /// Identifiers available in the directory, sorted.
    pub fn identifiers(&self) -> Result<Vec<Identifier>, FetchError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            FetchError::Unavailable(format!("read dir {}: {e}", self.dir.display()))
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FetchError::Unavailable(format!("dir entry: {e}")))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(Identifier::new(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load(&self, id: &Identifier, range: TimeRangeSpec) -> Result<FetchResult, FetchError> {
        let not_found = || FetchError::NotFound {
            identifier: id.clone(),
        };
        let path = self.series_path(id).ok_or_else(not_found)?;

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => {
                return Err(FetchError::Unavailable(format!(
                    "read {}: {e}",
                    path.display()
                )))
            }
        };

        let file: SeriesFile =
            serde_json::from_str(&content).map_err(|e| FetchError::Malformed {
                identifier: id.clone(),
                message: e.to_string(),
            })?;

        Ok(FetchResult {
            identifier: id.clone(),
            requested_range: range,
            data_points: file.data_points,
            metadata: file.metadata,
        })
    }
}

impl SeriesSource for JsonDirSource {
    fn name(&self) -> &str {
        "json-dir"
    }

    fn fetch_series(&self, identifier: &Identifier, range: TimeRangeSpec) -> SeriesFuture {
        future::ready(self.load(identifier, range)).boxed_local()
    }
}
