/* Guide locale sync
 * Attaches translated setup-guide strings to the per-language message files of the landing page.
 *
 * 1. Resolve settings (defaults, guide-sync.cfg, command line)
 * 2. Load guide bundles from a directory, zip archive or mapping file
 * 3. For every language with a bundle, replace the `guide` key of messages/<lang>.json
 * 4. Report OK/SKIP per language and a final summary
 */

pub mod bundle;
pub mod config;
pub mod error;
pub mod language;
pub mod locale_file;
pub mod updater;

use itertools::Itertools;
use std::io::Write;
use tracing::warn;

pub use crate::bundle::{BundleSet, BundleSource};
pub use crate::config::{Config, Overrides};
pub use crate::error::{Result, SyncError};
pub use crate::language::LanguageCode;
pub use crate::locale_file::LocaleFile;
pub use crate::updater::{LocaleStore, Outcome, UpdateReport};

/// Runs one sync with resolved settings, writing the OK/SKIP/Done lines to `out`.
pub fn sync<W: Write>(config: &Config, out: &mut W) -> Result<UpdateReport> {
    let mut bundles = BundleSet::load(&config.bundles)?;
    if !config.only.is_empty() {
        let missing = bundles.retain_languages(&config.only);
        if !missing.is_empty() {
            warn!("No bundle for requested languages: {}", missing.iter().join(", "));
        }
    }

    let store = LocaleStore::new(&config.messages_dir, config.merge_key.as_str())
        .with_indent(config.indent);

    let report = store.apply_with(&bundles, |outcome| {
        writeln!(out, "{}", outcome).map_err(SyncError::Output)
    })?;

    writeln!(out, "{}", report.summary(config.label.as_deref())).map_err(SyncError::Output)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::path::Path;
    use tempfile::TempDir;

    // Accepts `remaining` writes, then fails every later one
    struct FlakyOut {
        remaining: usize,
    }

    impl Write for FlakyOut {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.remaining -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn config(messages: &Path, bundles: &Path) -> Config {
        Config {
            messages_dir: messages.to_path_buf(),
            bundles: bundles.to_path_buf(),
            merge_key: "guide".to_string(),
            indent: 2,
            only: Vec::new(),
            label: None,
        }
    }

    #[test]
    fn output_failure_stops_before_the_next_file() {
        let dir = TempDir::new().unwrap();
        let messages = dir.path().join("messages");
        fs::create_dir(&messages).unwrap();
        fs::write(messages.join("tr.json"), "{}").unwrap();
        fs::write(messages.join("vi.json"), "{}").unwrap();
        let bundles = dir.path().join("guide.json");
        fs::write(&bundles, r#"{"tr": {"a": "1"}, "vi": {"a": "2"}}"#).unwrap();

        let err = sync(&config(&messages, &bundles), &mut FlakyOut { remaining: 0 }).unwrap_err();

        assert!(matches!(err, SyncError::Output(_)));
        // the file whose line failed was already written, the next one is untouched
        assert!(fs::read_to_string(messages.join("tr.json")).unwrap().contains("guide"));
        assert_eq!(fs::read_to_string(messages.join("vi.json")).unwrap(), "{}");
    }
}
