//! Field rules for parsed curation metadata
//!
//! Pure checks over the flat property map: mandatory fields, release date
//! shape and calendar validity, ISO 639-1 language codes, launch command
//! hygiene, tag checks against the master tag list, the extreme flag, and
//! the library/platform classification. Reference data comes in through
//! [`RuleContext`] so the checks themselves never touch the network.

use crate::error::Result;
use crate::tables;
use crate::types::{CurationType, PropertyMap};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// Fields every curation must carry, in reporting order
const MANDATORY_FIELDS: [&str; 6] = [
    "Title",
    "Languages",
    "Source",
    "Launch Command",
    "Status",
    "Application Path",
];

/// Reference data the field rules check against
pub struct RuleContext<'a> {
    /// Master tag list, the union of every tag source
    pub known_tags: &'a BTreeSet<String>,
    /// Launch commands already present in the master database
    pub launch_commands: &'a BTreeSet<String>,
}

/// A metadata mistake that blocks the curation
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldError {
    /// Release date does not follow `YYYY-MM-DD`
    InvalidDateFormat {
        /// The trimmed value the curator entered
        value: String,
    },
    /// Release date is shaped correctly but names a day that does not exist
    InvalidCalendarDate,
    /// A language entry contains a comma
    CommaSeparatedLanguages,
    /// A language was written as its English name
    LanguageNameInsteadOfCode {
        /// The name the curator wrote
        name: String,
        /// The ISO 639-1 code to use instead
        code: String,
    },
    /// A common wrong code with a known correct replacement
    WrongLanguageCode {
        /// The code the curator wrote
        wrong: String,
        /// The correct ISO 639-1 code
        code: String,
        /// English name of the language
        name: String,
    },
    /// A language code that is not ISO 639-1 at all
    UnknownLanguageCode {
        /// The code the curator wrote
        code: String,
    },
    /// A mandatory field is absent or empty
    MissingMandatoryField {
        /// Field name
        name: &'static str,
    },
    /// The launch command uses https
    HttpsLaunchCommand,
    /// The launch command already exists in the master database
    DuplicateLaunchCommand,
    /// No tags at all
    MissingTags,
    /// Marked extreme without carrying any extreme tag
    ExtremeLacksExtremeTags,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDateFormat { value } => write!(
                f,
                "Release date {value} is incorrect. Release dates should always be in `YYYY-MM-DD` format."
            ),
            Self::InvalidCalendarDate => {
                write!(f, "Invalid release date. Ensure entered date is valid.")
            }
            Self::CommaSeparatedLanguages => write!(
                f,
                "Languages should be separated with semicolons, not commas."
            ),
            Self::LanguageNameInsteadOfCode { name, code } => write!(
                f,
                "Languages must be in ISO 639-1 format, so please use `{code}` instead of `{name}`"
            ),
            Self::WrongLanguageCode { wrong, code, name } => write!(
                f,
                "The correct ISO 639-1 language code for {name} is `{code}`, not `{wrong}`."
            ),
            Self::UnknownLanguageCode { code } => {
                write!(f, "Code `{code}` is not a valid ISO 639-1 language code.")
            }
            Self::MissingMandatoryField { name } => {
                write!(f, "The `{name}` property in the meta file is mandatory.")
            }
            Self::HttpsLaunchCommand => write!(
                f,
                "Found `https` in launch command. All launch commands must use `http` instead of `https`."
            ),
            Self::DuplicateLaunchCommand => write!(
                f,
                "Identical launch command already present in the master database. Is your curation a duplicate?"
            ),
            Self::MissingTags => write!(f, "Missing tags. At least one tag must be specified."),
            Self::ExtremeLacksExtremeTags => {
                write!(f, "Curation is extreme but lacks extreme tags.")
            }
        }
    }
}

/// A metadata oddity worth flagging without blocking the curation
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldWarning {
    /// A tag outside the master tag list
    UnknownTag {
        /// The tag as written
        tag: String,
    },
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag { tag } => write!(
                f,
                "Tag `{tag}` is not a known tag, please verify (did you write it correctly?)."
            ),
        }
    }
}

/// Everything the field rules concluded about one property map
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldReport {
    /// Blocking mistakes, in check order
    pub errors: Vec<FieldError>,
    /// Non-blocking findings, in check order
    pub warnings: Vec<FieldWarning>,
    /// Whether the curation counts as extreme
    pub is_extreme: bool,
    /// Library/platform classification
    pub curation_type: CurationType,
}

/// Run every field rule over a parsed property map.
pub fn check_fields(props: &PropertyMap, context: &RuleContext<'_>) -> Result<FieldReport> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_release_date(props, &mut errors)?;
    check_languages(props, &mut errors);

    for name in MANDATORY_FIELDS {
        if present(props, name).is_none() {
            errors.push(FieldError::MissingMandatoryField { name });
        }
    }

    if let Some(command) = present(props, "Launch Command") {
        if command.contains("https") {
            errors.push(FieldError::HttpsLaunchCommand);
        }
        if context.launch_commands.contains(command) {
            errors.push(FieldError::DuplicateLaunchCommand);
        }
    }

    let tags = parse_tags(props);
    if tags.is_empty() {
        errors.push(FieldError::MissingTags);
    } else {
        for tag in &tags {
            if !context.known_tags.contains(tag) {
                warnings.push(FieldWarning::UnknownTag { tag: tag.clone() });
            }
        }
    }

    let mut is_extreme =
        present(props, "Extreme").is_some_and(|value| value == "Yes" || value == "true");
    if !tags.is_empty() {
        let has_extreme_tags = tags.iter().any(|tag| tables::extreme_tags().contains(tag));
        let has_legacy_extreme = tags.iter().any(|tag| tag == "LEGACY-Extreme");
        if has_extreme_tags || has_legacy_extreme {
            is_extreme = true;
        }
        if is_extreme && !has_extreme_tags {
            errors.push(FieldError::ExtremeLacksExtremeTags);
        }
    }

    Ok(FieldReport {
        errors,
        warnings,
        is_extreme,
        curation_type: classify(props),
    })
}

/// Field value when the field exists with a non-empty value
fn present<'a>(props: &'a PropertyMap, name: &str) -> Option<&'a str> {
    props
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn check_release_date(props: &PropertyMap, errors: &mut Vec<FieldError>) -> Result<()> {
    let Some(value) = present(props, "Release Date") else {
        return Ok(());
    };
    let date_string = value.trim();
    if date_string.is_empty() {
        return Ok(());
    }

    // year, or year-month, or full date
    let shape = Regex::new(r"^\d{4}(-\d{2}){0,2}$")?;
    if !shape.is_match(date_string) {
        errors.push(FieldError::InvalidDateFormat {
            value: date_string.to_string(),
        });
    } else if date_string.len() == 10 && !is_valid_calendar_date(date_string) {
        errors.push(FieldError::InvalidCalendarDate);
    }
    Ok(())
}

fn is_valid_calendar_date(date: &str) -> bool {
    let mut parts = date.split('-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let (Ok(year), Ok(month), Ok(day)) =
        (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>())
    else {
        return false;
    };
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

fn check_languages(props: &PropertyMap, errors: &mut Vec<FieldError>) {
    let Some(value) = present(props, "Languages") else {
        return;
    };
    for token in value.split(';') {
        let code = token.trim();
        if tables::is_language_code(code) || code.is_empty() {
            continue;
        }
        if code.contains(',') {
            errors.push(FieldError::CommaSeparatedLanguages);
        } else if let Some(alpha2) = tables::code_for_language_name(code) {
            errors.push(FieldError::LanguageNameInsteadOfCode {
                name: code.to_string(),
                code: alpha2.to_string(),
            });
        } else if let Some(alpha2) = tables::replacement_for(code) {
            errors.push(FieldError::WrongLanguageCode {
                wrong: code.to_string(),
                code: alpha2.to_string(),
                name: tables::english_name_for(alpha2).unwrap_or_default().to_string(),
            });
        } else {
            errors.push(FieldError::UnknownLanguageCode {
                code: code.to_string(),
            });
        }
    }
}

/// Split the `Tags` field on semicolons, dropping empty entries
fn parse_tags(props: &PropertyMap) -> Vec<String> {
    props
        .get("Tags")
        .map(String::as_str)
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Library and platform decide what kind of entry this becomes
fn classify(props: &PropertyMap) -> CurationType {
    if props
        .get("Library")
        .is_some_and(|library| library.contains("theatre"))
    {
        return CurationType::Animation;
    }
    match props.get("Platform") {
        None => CurationType::FlashGame,
        Some(platform) if platform.contains("Flash") => CurationType::FlashGame,
        Some(_) => CurationType::OtherGame,
    }
}
