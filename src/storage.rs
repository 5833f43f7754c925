//! Artifact storage on the local filesystem.
//!
//! Every asset reads and writes its artifacts through an [`ArtifactStore`]
//! rooted at the configured data directory. Writes go to a temporary file
//! in the same directory and are renamed into place, so an aborted write
//! never leaves a partial artifact behind.

use crate::error::{PipelineError, PipelineResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Artifact file names.
pub const TOPSTORY_IDS: &str = "topstory_ids.json";
pub const TOPSTORIES: &str = "topstories.csv";
pub const MOST_FREQUENT_WORDS: &str = "most_frequent_words.json";
pub const IRIS_DATASET: &str = "iris_dataset.csv";
pub const IRIS_SETOSA: &str = "iris_setosa.csv";

/// Filesystem-backed artifact store.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    data_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of a named artifact.
    pub fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure_dir(&self) -> PipelineResult<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| PipelineError::io(&self.data_dir, e))
    }

    /// Atomically write an artifact using the given writer callback.
    pub fn write_with<F>(&self, name: &str, write: F) -> PipelineResult<PathBuf>
    where
        F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> PipelineResult<()>,
    {
        self.ensure_dir()?;
        let path = self.path(name);

        let mut tmp =
            NamedTempFile::new_in(&self.data_dir).map_err(|e| PipelineError::io(&self.data_dir, e))?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            write(&mut writer)?;
            writer.flush().map_err(|e| PipelineError::io(&path, e))?;
        }
        tmp.persist(&path)
            .map_err(|e| PipelineError::io(&path, e.error))?;

        debug!("Wrote artifact {}", path.display());
        Ok(path)
    }

    /// Serialize a value as a JSON artifact.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> PipelineResult<PathBuf> {
        self.write_with(name, |w| {
            serde_json::to_writer(w, value)?;
            Ok(())
        })
    }

    /// Open an artifact for reading.
    pub fn open(&self, name: &str) -> PipelineResult<BufReader<File>> {
        let path = self.path(name);
        if !path.exists() {
            return Err(PipelineError::MissingArtifact(path));
        }
        let file = File::open(&path).map_err(|e| PipelineError::io(&path, e))?;
        Ok(BufReader::new(file))
    }

    /// Read and decode a JSON artifact.
    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> PipelineResult<T> {
        let reader = self.open(name)?;
        Ok(serde_json::from_reader(reader)?)
    }
}
