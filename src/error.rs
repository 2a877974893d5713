use std::path::PathBuf;
use thiserror::Error;

// Every failure here is fatal for the run. A missing locale file is not an error,
// it is reported as a skip by the updater.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write report line: {0}")]
    Output(#[source] std::io::Error),
    #[error("Malformed JSON in {path}: {source}")]
    MalformedJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Top level of {0} is not a JSON object")]
    NotAnObject(PathBuf),
    #[error("Invalid language code {0:?}")]
    InvalidLanguageCode(String),
    #[error("Language {code} is provided twice in {path}")]
    DuplicateLanguage { code: String, path: PathBuf },
    #[error("Bundle source {0} does not exist")]
    MissingBundleSource(PathBuf),
    #[error("Invalid zip archive {path}: {source}")]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },
    #[error("Failed to load config {path}: {source}")]
    Config { path: PathBuf, source: ini::Error },
    #[error("Invalid config value for {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
    #[error("No bundle source given, pass a path or set paths.bundles in the config")]
    NoBundleSource,
}

impl SyncError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::MalformedJson {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_setting(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
