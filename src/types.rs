//! Core types for curation-validator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat string-keyed metadata map parsed from a curation's meta file.
///
/// Unknown/extra keys are preserved but unused by the rule engine.
pub type PropertyMap = BTreeMap<String, String>;

/// Content classification derived from the `Library` and `Platform` fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurationType {
    /// Flash-based game (also the default when no platform is given)
    FlashGame,
    /// Game on any non-Flash platform
    OtherGame,
    /// Animation (theatre library)
    Animation,
}

/// Archive format accepted by the validator, detected by file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// 7-Zip archive (.7z)
    SevenZip,
    /// ZIP archive (.zip)
    Zip,
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveFormat::SevenZip => write!(f, "7z"),
            ArchiveFormat::Zip => write!(f, "zip"),
        }
    }
}

/// Which image a [`CurationImage`] payload carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// The curation's logo.png
    Logo,
    /// The curation's ss.png
    Screenshot,
}

/// A base64-encoded image lifted out of the curation archive
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationImage {
    /// Which image this is
    #[serde(rename = "type")]
    pub kind: ImageKind,
    /// Standard-alphabet base64 of the file bytes
    pub data: String,
}

/// Structured result of validating one curation archive
///
/// `errors` and `warnings` keep the insertion order of the checks that
/// produced them; callers and tests rely on that order. The `Option` fields
/// are `None` whenever validation aborted before the corresponding stage ran
/// (unsupported format, oversized archive, unparseable metadata), never a
/// defaulted `false`/empty value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Blocking problems; a non-empty list means the submission is rejected
    pub errors: Vec<String>,
    /// Advisory problems; the submission may still be accepted
    pub warnings: Vec<String>,
    /// Extreme-content classification, `None` if the meta stage never ran
    pub is_extreme: Option<bool>,
    /// Game/animation classification, `None` if the meta stage never ran
    pub curation_type: Option<CurationType>,
    /// Parsed metadata, `Some` only when a meta file decoded successfully
    pub metadata: Option<PropertyMap>,
    /// Logo/screenshot payloads found in the archive (at most one logo,
    /// every screenshot)
    pub images: Vec<CurationImage>,
}

impl ValidationOutcome {
    /// Outcome for a validation that stopped before reaching the meta stage
    pub(crate) fn aborted(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            errors,
            warnings,
            ..Self::default()
        }
    }

    /// True when the curation passed with no blocking problems
    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }
}
