use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

pub const DEFAULT_INDENT: usize = 2;

/// One per-language message file, e.g. `messages/de.json`.
///
/// Keys keep the order they had on disk; a key that did not exist before is
/// appended after the existing ones.
#[derive(Debug)]
pub struct LocaleFile {
    path: PathBuf,
    document: Map<String, Value>,
}

impl LocaleFile {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = fs::read_to_string(&path).map_err(|err| SyncError::read(&path, err))?;
        let document = match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(document)) => document,
            Ok(_) => return Err(SyncError::NotAnObject(path)),
            Err(err) => return Err(SyncError::malformed_json(path, err)),
        };
        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.document.keys().map(String::as_str)
    }

    /// Replaces the whole subtree under `key`. Nothing of the previous value is kept.
    pub fn replace_section(&mut self, key: &str, value: Value) -> Option<Value> {
        self.document.insert(key.to_string(), value)
    }

    pub fn to_pretty_string(&self, indent: usize) -> Result<String> {
        let indent = " ".repeat(indent);
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.document
            .serialize(&mut ser)
            .map_err(|source| SyncError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        // serde_json only emits valid UTF-8
        let mut out = String::from_utf8_lossy(&buf).into_owned();
        out.push('\n');
        Ok(out)
    }

    /// Writes the document back to where it was loaded from, overwriting it.
    pub fn save(&self, indent: usize) -> Result<()> {
        let contents = self.to_pretty_string(indent)?;
        fs::write(&self.path, contents).map_err(|err| SyncError::write(&self.path, err))
    }
}
