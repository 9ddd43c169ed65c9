//! Bundled reference tables
//!
//! Static lookup data shipped inside the crate: the ISO 639-1 code table,
//! common language-code mistakes, extreme tags, the embedded-filename
//! deny-list, and overused localflash folder names. Each table is embedded
//! with `include_str!` and decoded exactly once per process.

// The tables ship inside the binary and are covered by the parse tests below,
// so an init panic can only mean a broken build.
#![allow(clippy::expect_used)]

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// One entry of the bundled ISO 639-1 table
#[derive(Clone, Debug, Deserialize)]
pub struct LanguageCode {
    /// Two-letter alpha-2 code
    pub alpha2: String,
    /// English language name
    #[serde(rename = "English")]
    pub english: String,
}

#[derive(Deserialize)]
struct TagTable {
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct NameTable {
    names: Vec<String>,
}

static LANGUAGE_CODES: LazyLock<Vec<LanguageCode>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("data/language-codes.json"))
        .expect("bundled language-codes.json must parse")
});

static LANGUAGE_CODE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| LANGUAGE_CODES.iter().map(|c| c.alpha2.as_str()).collect());

static LANGUAGE_NAME_TO_CODE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    LANGUAGE_CODES
        .iter()
        .map(|c| (c.english.as_str(), c.alpha2.as_str()))
        .collect()
});

static LANGUAGE_REPLACEMENTS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("data/lang_replacements.json"))
        .expect("bundled lang_replacements.json must parse")
});

static EXTREME_TAGS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let table: TagTable = serde_json::from_str(include_str!("data/extreme_tags.json"))
        .expect("bundled extreme_tags.json must parse");
    table.tags.into_iter().collect()
});

static BAD_SYSTEM_FILES: LazyLock<Vec<String>> = LazyLock::new(|| {
    let table: NameTable = serde_json::from_str(include_str!("data/bad_system_files.json"))
        .expect("bundled bad_system_files.json must parse");
    table.names
});

static COMMON_LOCALFLASH_NAMES: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let table: NameTable =
        serde_json::from_str(include_str!("data/common_localflash_names.json"))
            .expect("bundled common_localflash_names.json must parse");
    table.names.into_iter().collect()
});

/// True when `token` is a known ISO 639-1 alpha-2 code
pub fn is_language_code(token: &str) -> bool {
    LANGUAGE_CODE_SET.contains(token)
}

/// Alpha-2 code for an exact English language name, if the name is known
pub fn code_for_language_name(name: &str) -> Option<&'static str> {
    LANGUAGE_NAME_TO_CODE.get(name).copied()
}

/// English name for an alpha-2 code, if the code is known
pub fn english_name_for(code: &str) -> Option<&'static str> {
    LANGUAGE_CODES
        .iter()
        .find(|c| c.alpha2 == code)
        .map(|c| c.english.as_str())
}

/// Correct alpha-2 code for a commonly-mistaken token (e.g. `jp` for `ja`)
pub fn replacement_for(token: &str) -> Option<&'static str> {
    LANGUAGE_REPLACEMENTS.get(token).map(String::as_str)
}

/// Tags that classify a curation as extreme
pub fn extreme_tags() -> &'static HashSet<String> {
    &EXTREME_TAGS
}

/// Embedded filenames that are never allowed in a curation
pub fn bad_system_files() -> &'static [String] {
    &BAD_SYSTEM_FILES
}

/// Overused localflash payload-folder names
pub fn common_localflash_names() -> &'static HashSet<String> {
    &COMMON_LOCALFLASH_NAMES
}
