use itertools::Itertools;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::bundle::BundleSet;
use crate::error::Result;
use crate::language::LanguageCode;
use crate::locale_file::{LocaleFile, DEFAULT_INDENT};

/// What happened to one language during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated(LanguageCode),
    /// No locale file at this path, nothing was written
    Skipped(PathBuf),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Updated(code) => write!(f, "OK: {}", code),
            Outcome::Skipped(path) => write!(f, "SKIP: {}", path.display()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub outcomes: Vec<Outcome>,
}

impl UpdateReport {
    pub fn updated(&self) -> impl Iterator<Item = &LanguageCode> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            Outcome::Updated(code) => Some(code),
            Outcome::Skipped(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            Outcome::Skipped(path) => Some(path.as_path()),
            Outcome::Updated(_) => None,
        })
    }

    /// `Done: batch 2: 4 updated, 1 skipped (tr, vi, sw, tl)`
    pub fn summary(&self, label: Option<&str>) -> String {
        let prefix = label.map(|label| format!("{}: ", label)).unwrap_or_default();
        format!(
            "Done: {}{} updated, {} skipped ({})",
            prefix,
            self.updated().count(),
            self.skipped().count(),
            self.updated().join(", ")
        )
    }
}

/// Directory of `<lang>.json` message files and the top-level key guide bundles live under.
#[derive(Debug, Clone)]
pub struct LocaleStore {
    root: PathBuf,
    merge_key: String,
    indent: usize,
}

impl LocaleStore {
    pub fn new(root: impl Into<PathBuf>, merge_key: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            merge_key: merge_key.into(),
            indent: DEFAULT_INDENT,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn path_for(&self, code: &LanguageCode) -> PathBuf {
        self.root.join(code.file_name())
    }

    /// Replaces the merge key of one language's file with `bundle`.
    ///
    /// A missing file is not an error: the language is reported as skipped and
    /// no file is created.
    pub fn update(&self, code: &LanguageCode, bundle: &Value) -> Result<Outcome> {
        let path = self.path_for(code);
        if !path.is_file() {
            debug!("No locale file for {} at {}", code, path.display());
            return Ok(Outcome::Skipped(path));
        }

        let mut file = LocaleFile::load(path)?;
        if file.replace_section(&self.merge_key, bundle.clone()).is_some() {
            debug!("Replaced existing {:?} section of {}", self.merge_key, file.path().display());
        }
        file.save(self.indent)?;
        Ok(Outcome::Updated(code.clone()))
    }

    /// Applies every bundle in order, handing each outcome to `on_outcome` as soon as
    /// it is known. The first error, from the update or from `on_outcome`, stops the
    /// run; files already written stay written.
    pub fn apply_with<F>(&self, bundles: &BundleSet, mut on_outcome: F) -> Result<UpdateReport>
    where
        F: FnMut(&Outcome) -> Result<()>,
    {
        info!(
            "Updating {} languages in {} under {:?}",
            bundles.len(),
            self.root.display(),
            self.merge_key
        );
        let mut report = UpdateReport::default();
        for (code, bundle) in bundles.iter() {
            let outcome = self.update(code, bundle)?;
            on_outcome(&outcome)?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    pub fn apply(&self, bundles: &BundleSet) -> Result<UpdateReport> {
        self.apply_with(bundles, |_| Ok(()))
    }
}
