use serde_json::Value;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Read;
use std::iter::FromIterator;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{Result, SyncError};
use crate::language::LanguageCode;

/// Where guide translations come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleSource {
    /// Directory with one `<lang>.json` per language
    Directory,
    /// Zip archive with `<lang>.json` entries, at any depth
    Zip,
    /// Single JSON object mapping language codes to bundles
    Mapping,
}

impl BundleSource {
    pub fn detect(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::MissingBundleSource(path.to_path_buf()));
        }
        if path.is_dir() {
            Ok(BundleSource::Directory)
        } else if path.extension() == Some(OsStr::new("zip")) {
            Ok(BundleSource::Zip)
        } else {
            Ok(BundleSource::Mapping)
        }
    }
}

/// Guide translations keyed by language, in the order they will be applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BundleSet {
    bundles: Vec<(LanguageCode, Value)>,
}

impl BundleSet {
    pub fn load(path: &Path) -> Result<Self> {
        let source = BundleSource::detect(path)?;
        debug!("Loading bundles from {} as {:?}", path.display(), source);
        let set = match source {
            BundleSource::Directory => Self::load_directory(path)?,
            BundleSource::Zip => Self::load_zip(path)?,
            BundleSource::Mapping => Self::load_mapping(path)?,
        };
        debug!("Loaded {} bundles", set.len());
        Ok(set)
    }

    fn load_directory(path: &Path) -> Result<Self> {
        let mut set = Self::default();
        let entries = fs::read_dir(path).map_err(|err| SyncError::read(path, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| SyncError::read(path, err))?;
            let file_path = entry.path();
            if !file_path.is_file() {
                continue;
            }
            let code = match language_of(&file_path) {
                Some(code) => code,
                None => continue,
            };
            let contents =
                fs::read_to_string(&file_path).map_err(|err| SyncError::read(&file_path, err))?;
            let bundle = serde_json::from_str(&contents)
                .map_err(|err| SyncError::malformed_json(&file_path, err))?;
            set.push(code, bundle, path)?;
        }
        set.bundles.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(set)
    }

    fn load_zip(path: &Path) -> Result<Self> {
        let zip_err = |source| SyncError::Zip {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(|err| SyncError::read(path, err))?;
        let mut archive = ZipArchive::new(file).map_err(zip_err)?;

        let mut set = Self::default();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(zip_err)?;
            let entry_path = PathBuf::from(entry.name());
            let code = match language_of(&entry_path) {
                Some(code) => code,
                None => continue,
            };
            let mut contents = String::new();
            entry
                .read_to_string(&mut contents)
                .map_err(|err| SyncError::read(path.join(&entry_path), err))?;
            let bundle = serde_json::from_str(&contents)
                .map_err(|err| SyncError::malformed_json(path.join(&entry_path), err))?;
            set.push(code, bundle, path)?;
        }
        set.bundles.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(set)
    }

    fn load_mapping(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| SyncError::read(path, err))?;
        let mapping = match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(mapping)) => mapping,
            Ok(_) => return Err(SyncError::NotAnObject(path.to_path_buf())),
            Err(err) => return Err(SyncError::malformed_json(path, err)),
        };

        let mut set = Self::default();
        for (code, bundle) in mapping {
            set.push(LanguageCode::new(&code)?, bundle, path)?;
        }
        Ok(set)
    }

    fn push(&mut self, code: LanguageCode, bundle: Value, origin: &Path) -> Result<()> {
        if self.bundles.iter().any(|(existing, _)| existing == &code) {
            return Err(SyncError::DuplicateLanguage {
                code: code.to_string(),
                path: origin.to_path_buf(),
            });
        }
        self.bundles.push((code, bundle));
        Ok(())
    }

    /// Keeps only the listed languages and returns the requested ones that had no bundle.
    pub fn retain_languages(&mut self, only: &[LanguageCode]) -> Vec<LanguageCode> {
        self.bundles.retain(|(code, _)| only.contains(code));
        let present: HashSet<&LanguageCode> = self.bundles.iter().map(|(code, _)| code).collect();
        only.iter()
            .filter(|code| !present.contains(code))
            .cloned()
            .collect()
    }

    pub fn get(&self, code: &str) -> Option<&Value> {
        self.bundles
            .iter()
            .find(|(existing, _)| existing == code)
            .map(|(_, bundle)| bundle)
    }

    pub fn languages(&self) -> impl Iterator<Item = &LanguageCode> {
        self.bundles.iter().map(|(code, _)| code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LanguageCode, &Value)> {
        self.bundles.iter().map(|(code, bundle)| (code, bundle))
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl FromIterator<(LanguageCode, Value)> for BundleSet {
    fn from_iter<I: IntoIterator<Item = (LanguageCode, Value)>>(iter: I) -> Self {
        Self {
            bundles: iter.into_iter().collect(),
        }
    }
}

// `<lang>.json` file names only; anything else in a bundle directory is noise
fn language_of(path: &Path) -> Option<LanguageCode> {
    if path.extension() != Some(OsStr::new("json")) {
        return None;
    }
    let stem = path.file_stem().and_then(OsStr::to_str)?;
    match LanguageCode::new(stem) {
        Ok(code) => Some(code),
        Err(_) => {
            warn!("Ignoring {}: not named after a language code", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn codes(set: &BundleSet) -> Vec<&str> {
        set.languages().map(LanguageCode::as_str).collect()
    }

    #[test]
    fn detects_source_kind() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("guide.zip");
        let json_path = dir.path().join("guide.json");
        fs::write(&zip_path, b"").unwrap();
        fs::write(&json_path, b"{}").unwrap();

        assert_eq!(BundleSource::detect(dir.path()).unwrap(), BundleSource::Directory);
        assert_eq!(BundleSource::detect(&zip_path).unwrap(), BundleSource::Zip);
        assert_eq!(BundleSource::detect(&json_path).unwrap(), BundleSource::Mapping);
        assert!(matches!(
            BundleSource::detect(&dir.path().join("nope")),
            Err(SyncError::MissingBundleSource(_))
        ));
    }

    #[test]
    fn directory_bundles_are_naturally_ordered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("vi.json"), r#"{"title": "Hướng dẫn cài đặt"}"#).unwrap();
        fs::write(dir.path().join("tr.json"), r#"{"title": "Kurulum Rehberi"}"#).unwrap();
        fs::write(dir.path().join("sw.json"), r#"{"title": "Mwongozo wa Usanidi"}"#).unwrap();
        fs::write(dir.path().join("README.md"), "notes").unwrap();
        fs::write(dir.path().join("index.json"), "{}").unwrap();

        let set = BundleSet::load(dir.path()).unwrap();
        assert_eq!(codes(&set), ["sw", "tr", "vi"]);
        assert_eq!(set.get("tr").unwrap()["title"], "Kurulum Rehberi");
    }

    #[test]
    fn mapping_keeps_document_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch2.json");
        fs::write(
            &path,
            r#"{"tr": {"title": "a"}, "vi": {"title": "b"}, "sw": {}, "tl": "x", "ur": {"title": "رہنما"}}"#,
        )
        .unwrap();

        let set = BundleSet::load(&path).unwrap();
        assert_eq!(codes(&set), ["tr", "vi", "sw", "tl", "ur"]);
        assert_eq!(set.get("tl").unwrap(), &json!("x"));
        assert_eq!(set.get("ur").unwrap()["title"], "رہنما");
    }

    #[test]
    fn mapping_rejects_bad_codes_and_non_objects() {
        let dir = TempDir::new().unwrap();
        let bad_code = dir.path().join("bad.json");
        fs::write(&bad_code, r#"{"../etc/passwd": {}}"#).unwrap();
        let not_object = dir.path().join("list.json");
        fs::write(&not_object, r#"[{"tr": {}}]"#).unwrap();

        assert!(matches!(
            BundleSet::load(&bad_code),
            Err(SyncError::InvalidLanguageCode(_))
        ));
        assert!(matches!(
            BundleSet::load(&not_object),
            Err(SyncError::NotAnObject(_))
        ));
    }

    #[test]
    fn malformed_bundle_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("de.json"), r#"{"title": "#).unwrap();

        let err = BundleSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, SyncError::MalformedJson { .. }));
        assert!(err.to_string().contains("de.json"));
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn zip_bundles_at_any_depth() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guide.zip");
        write_zip(
            &path,
            &[
                ("guides/ja.json", r#"{"title": "セットアップガイド"}"#),
                ("de.json", r#"{"title": "Einrichtung"}"#),
                ("guides/notes.txt", "ignored"),
            ],
        );

        let set = BundleSet::load(&path).unwrap();
        assert_eq!(codes(&set), ["de", "ja"]);
        assert_eq!(set.get("ja").unwrap()["title"], "セットアップガイド");
    }

    #[test]
    fn zip_with_duplicate_language_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guide.zip");
        write_zip(&path, &[("a/es.json", "{}"), ("b/es.json", "{}")]);

        assert!(matches!(
            BundleSet::load(&path),
            Err(SyncError::DuplicateLanguage { .. })
        ));
    }

    #[test]
    fn broken_zip_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guide.zip");
        fs::write(&path, b"definitely not a zip").unwrap();

        assert!(matches!(BundleSet::load(&path), Err(SyncError::Zip { .. })));
    }

    #[test]
    fn retain_reports_missing_languages() {
        let mut set: BundleSet = ["tr", "vi", "ur"]
            .iter()
            .map(|c| (LanguageCode::new(c).unwrap(), json!({})))
            .collect();
        let only = vec![
            LanguageCode::new("ur").unwrap(),
            LanguageCode::new("xx").unwrap(),
            LanguageCode::new("tr").unwrap(),
        ];

        let missing = set.retain_languages(&only);

        assert_eq!(codes(&set), ["tr", "ur"]);
        assert_eq!(missing, vec![LanguageCode::new("xx").unwrap()]);
    }
}
