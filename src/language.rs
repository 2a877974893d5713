use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lexical_sort::natural_lexical_only_alnum_cmp;

use crate::error::SyncError;

// "tr", "pt-BR", "zh_Hant", "sr-Latn-RS"
static LANGUAGE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,3}(?:[-_][A-Za-z0-9]{2,8})*$").unwrap());

/// Language code naming a locale file. A valid code never contains a path
/// separator, so `<root>/<code>.json` always stays inside `root`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: &str) -> Result<Self, SyncError> {
        if LANGUAGE_CODE.is_match(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(SyncError::InvalidLanguageCode(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// Natural order, so "pt" < "pt-BR" < "tr" regardless of case
impl PartialOrd for LanguageCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LanguageCode {
    fn cmp(&self, other: &Self) -> Ordering {
        match natural_lexical_only_alnum_cmp(&self.0, &other.0) {
            Ordering::Equal => self.0.cmp(&other.0),
            ord => ord,
        }
    }
}
