use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::OwnerScope;

/// Which external collaborator an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Properties,
    Wells,
    Registry,
    Links,
}

impl StoreKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreKind::Properties => "property store",
            StoreKind::Wells => "well store",
            StoreKind::Registry => "well registry",
            StoreKind::Links => "link store",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    //reads are fatal: the run has no inputs without them
    #[error("failed to read {store} for {scope}: {source}")]
    StoreRead {
        store: StoreKind,
        scope: OwnerScope,
        #[source]
        source: StoreError,
    },
    #[error("failed to write {store} for {scope}: {source}")]
    StoreWrite {
        store: StoreKind,
        scope: OwnerScope,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot decode error: {0}")]
    Decode(String),
    #[error("snapshot encode error: {0}")]
    Encode(String),
}
