//! JSON snapshot persistence.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use mims_types::{Broker, IntervalSet, MimsError, Ohlcv, Pair, PairId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while saving or loading a snapshot.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse JSON.
    #[error("Failed to parse snapshot '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to serialize JSON.
    #[error("Failed to serialize snapshot: {0}")]
    SerializeJson(#[from] serde_json::Error),
}

impl From<StoreError> for MimsError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

/// Rows of one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairCandles {
    /// Owning pair.
    pub pair_id: PairId,
    /// Rows, ascending.
    pub bars: Vec<Ohlcv>,
}

/// Availability index of one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairCoverage {
    /// Owning pair.
    pub pair_id: PairId,
    /// Known ranges.
    pub ranges: IntervalSet,
}

/// A point-in-time copy of every row a [`MemoryStore`](crate::MemoryStore) holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Brokers.
    pub brokers: Vec<Broker>,
    /// Pairs.
    pub pairs: Vec<Pair>,
    /// Candle rows per pair.
    pub candles: Vec<PairCandles>,
    /// Availability per pair.
    pub availability: Vec<PairCoverage>,
}

/// A snapshot file on disk.
///
/// The default location is `store.json` under the platform data directory.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// File name used inside a data directory.
    pub const FILE_NAME: &'static str = "store.json";

    /// Points at `store.json` inside `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILE_NAME),
        }
    }

    /// Returns the default data directory.
    ///
    /// Uses the `directories` crate to find the appropriate location:
    /// - Linux: `~/.local/share/mims/`
    /// - macOS: `~/Library/Application Support/mims/`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\mims\`
    ///
    /// Falls back to `~/.mims/` if the platform-specific location
    /// cannot be determined.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        ProjectDirs::from("", "", "mims").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes `snapshot`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json).map_err(|e| StoreError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), pairs = snapshot.pairs.len(), "saved snapshot");
        Ok(())
    }

    /// Reads the snapshot, or an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        if !self.exists() {
            tracing::debug!(path = %self.path.display(), "no snapshot, starting empty");
            return Ok(Snapshot::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::ReadFile {
            path: self.path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| StoreError::ParseJson {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Fallback for determining home directory.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".mims")
}
