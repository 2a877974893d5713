use ini::Ini;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, SyncError};
use crate::language::LanguageCode;
use crate::locale_file::DEFAULT_INDENT;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "guide-sync.cfg";
pub const DEFAULT_MESSAGES_DIR: &str = "messages";
pub const DEFAULT_MERGE_KEY: &str = "guide";
pub const MAX_INDENT: usize = 8;

const KNOWN_SETTINGS: &[&str] = &[
    "paths.messages",
    "paths.bundles",
    "output.key",
    "output.indent",
    "run.label",
    "run.only",
];

/// Settings given explicitly on the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub messages_dir: Option<PathBuf>,
    pub bundles: Option<PathBuf>,
    pub merge_key: Option<String>,
    pub indent: Option<usize>,
    pub only: Vec<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub messages_dir: PathBuf,
    pub bundles: PathBuf,
    pub merge_key: String,
    pub indent: usize,
    pub only: Vec<LanguageCode>,
    pub label: Option<String>,
}

impl Config {
    /// Defaults, then the config file, then `overrides`.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let settings = match &overrides.config {
            Some(path) => Settings::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Settings::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Settings::default(),
        };
        Self::from_parts(settings, overrides)
    }

    fn from_parts(settings: Settings, overrides: Overrides) -> Result<Self> {
        let messages_dir = overrides
            .messages_dir
            .or_else(|| settings.path("paths.messages"))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MESSAGES_DIR));

        let bundles = overrides
            .bundles
            .or_else(|| settings.path("paths.bundles"))
            .ok_or(SyncError::NoBundleSource)?;

        let merge_key = overrides
            .merge_key
            .or_else(|| settings.get("output.key").map(str::to_string))
            .unwrap_or_else(|| DEFAULT_MERGE_KEY.to_string());
        if merge_key.trim().is_empty() {
            return Err(SyncError::invalid_setting("output.key", "must not be empty"));
        }

        let indent = match overrides.indent {
            Some(indent) => indent,
            None => match settings.get("output.indent") {
                Some(raw) => parse_indent(raw)?,
                None => DEFAULT_INDENT,
            },
        };
        if indent > MAX_INDENT {
            return Err(SyncError::invalid_setting(
                "output.indent",
                format!("must be between 0 and {}, got {}", MAX_INDENT, indent),
            ));
        }

        let only = if !overrides.only.is_empty() {
            parse_languages(overrides.only.iter().map(String::as_str))?
        } else {
            match settings.get("run.only") {
                Some(raw) => parse_languages(raw.split(','))?,
                None => Vec::new(),
            }
        };

        let label = overrides
            .label
            .or_else(|| settings.get("run.label").map(str::to_string))
            .filter(|label| !label.trim().is_empty());

        Ok(Self {
            messages_dir,
            bundles,
            merge_key,
            indent,
            only,
            label,
        })
    }
}

/// Flat view of an INI file: `[section] key = value` becomes `section.key`.
#[derive(Debug, Default)]
struct Settings {
    entries: HashMap<String, String>,
    // relative paths in the file are relative to the file itself
    base_dir: PathBuf,
}

impl Settings {
    fn load(path: &Path) -> Result<Self> {
        let config_err = |source| SyncError::Config {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::open(path).map_err(|err| config_err(ini::Error::Io(err)))?;
        let ini = Ini::read_from_noescape(&mut file).map_err(config_err)?;

        let mut entries = HashMap::new();
        for (section, properties) in ini.iter() {
            if let Some(section) = section {
                for (key, value) in properties.iter() {
                    let name = format!("{}.{}", section, key);
                    if !KNOWN_SETTINGS.contains(&name.as_str()) {
                        warn!("Unknown setting {} in {}", name, path.display());
                        continue;
                    }
                    entries.insert(name, value.trim().to_string());
                }
            }
        }
        debug!("Loaded {} settings from {}", entries.len(), path.display());

        Ok(Self {
            entries,
            base_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        })
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(|raw| self.base_dir.join(raw))
    }
}

fn parse_indent(raw: &str) -> Result<usize> {
    raw.parse()
        .map_err(|_| SyncError::invalid_setting("output.indent", format!("{:?} is not a number", raw)))
}

fn parse_languages<'a>(raw: impl Iterator<Item = &'a str>) -> Result<Vec<LanguageCode>> {
    raw.map(str::trim)
        .filter(|code| !code.is_empty())
        .map(LanguageCode::new)
        .collect()
}
