//! Curation layout matching
//!
//! Classifies an archive listing as UUID-rooted (Flashpoint Core) or legacy,
//! locates the meta file, logo, screenshot and content folder, and checks the
//! extracted tree for the structural mistakes curators make most often.

use crate::error::Result;
use crate::tables;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Version 4 UUID directory name, lowercase hex
const UUID_DIR: &str = "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}";

/// Which naming grammar a curation follows
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutGrammar {
    /// Root folder named by the version 4 UUID that Flashpoint Core assigns
    UuidRooted,
    /// Root folder carrying any other name
    Legacy,
}

/// Members of interest located in an archive listing
#[derive(Clone, Debug)]
pub struct LayoutScan {
    /// Grammar the listing was matched against
    pub grammar: LayoutGrammar,
    /// Content folder members
    pub content_dirs: Vec<String>,
    /// Meta file members (`meta.yaml`, `meta.yml` or `meta.txt`)
    pub meta_files: Vec<String>,
    /// Logo members with the exact expected spelling
    pub logos: Vec<String>,
    /// Logo members matched case-insensitively
    pub logos_any_case: Vec<String>,
    /// Screenshot members with the exact expected spelling
    pub screenshots: Vec<String>,
    /// Screenshot members matched case-insensitively
    pub screenshots_any_case: Vec<String>,
}

impl LayoutScan {
    /// True when none of the four landmarks was located
    pub fn nothing_located(&self) -> bool {
        self.logos.is_empty()
            && self.screenshots.is_empty()
            && self.content_dirs.is_empty()
            && self.meta_files.is_empty()
    }
}

/// A structural mistake found in a curation
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StructureFinding {
    /// A logo exists but with wrong-case spelling
    LogoWrongCase,
    /// No logo under the expected name
    LogoMissing,
    /// A screenshot exists but with wrong-case spelling
    ScreenshotWrongCase,
    /// No screenshot under the expected name
    ScreenshotMissing,
    /// No content folder in the listing
    ContentFolderMissing,
    /// The content folder holds no files at all
    ContentFolderEmpty,
    /// Game files sit directly inside `content/localflash`
    LocalflashDirectContent,
    /// The single folder inside `content/localflash` has a collision-prone name
    LocalflashCommonName,
    /// A deny-listed system file appears somewhere in the listing
    ForbiddenFile(String),
}

impl fmt::Display for StructureFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogoWrongCase => write!(f, "Logo file extension must be lowercase."),
            Self::LogoMissing => {
                write!(f, "Logo file is either missing or its filename is incorrect.")
            }
            Self::ScreenshotWrongCase => write!(f, "Screenshot file extension must be lowercase."),
            Self::ScreenshotMissing => write!(
                f,
                "Screenshot file is either missing or its filename is incorrect."
            ),
            Self::ContentFolderMissing => write!(f, "Content folder not found."),
            Self::ContentFolderEmpty => write!(f, "No files found in content folder."),
            Self::LocalflashDirectContent => write!(
                f,
                "Content must be in additional folder in localflash rather than in localflash directly."
            ),
            Self::LocalflashCommonName => write!(
                f,
                "Extremely common localflash containing folder name, please change."
            ),
            Self::ForbiddenFile(name) => {
                write!(f, "{name} file found in curation, please remove.")
            }
        }
    }
}

/// Match the member listing against the curation grammar.
///
/// The UUID-rooted grammar applies as soon as any member is a bare version 4
/// UUID directory; everything else falls back to the legacy grammar, which
/// accepts any single root folder name. Landmark files are collected twice,
/// once with exact spelling and once case-insensitively, so wrong-case names
/// can be told apart from missing ones.
pub fn scan_members(members: &[String]) -> Result<LayoutScan> {
    let uuid_dir = Regex::new(&format!("^{UUID_DIR}/?$"))?;
    let grammar = if members.iter().any(|member| uuid_dir.is_match(member)) {
        LayoutGrammar::UuidRooted
    } else {
        LayoutGrammar::Legacy
    };

    let root = match grammar {
        LayoutGrammar::UuidRooted => UUID_DIR,
        LayoutGrammar::Legacy => "[^/]+",
    };
    let content_dir = Regex::new(&format!("^{root}/content/?$"))?;
    let meta_file = Regex::new(&format!(r"^{root}/meta\.(yaml|yml|txt)$"))?;
    let logo = Regex::new(&format!(r"^{root}/logo\.png$"))?;
    let logo_any_case = Regex::new(&format!(r"(?i)^{root}/logo\.png$"))?;
    let screenshot = Regex::new(&format!(r"^{root}/ss\.png$"))?;
    let screenshot_any_case = Regex::new(&format!(r"(?i)^{root}/ss\.png$"))?;

    let collect = |rule: &Regex| -> Vec<String> {
        members
            .iter()
            .filter(|member| rule.is_match(member))
            .cloned()
            .collect()
    };

    let scan = LayoutScan {
        grammar,
        content_dirs: collect(&content_dir),
        meta_files: collect(&meta_file),
        logos: collect(&logo),
        logos_any_case: collect(&logo_any_case),
        screenshots: collect(&screenshot),
        screenshots_any_case: collect(&screenshot_any_case),
    };
    debug!(
        grammar = ?scan.grammar,
        member_count = members.len(),
        "matched curation layout"
    );
    Ok(scan)
}

/// Run the structural checks over a scanned listing and its extracted tree.
///
/// Findings come out in a fixed order: logo, screenshot, content folder,
/// deny-listed files.
pub fn check_structure(
    scan: &LayoutScan,
    members: &[String],
    root: &Path,
) -> Result<Vec<StructureFinding>> {
    let mut findings = Vec::new();

    if differs_by_case(&scan.logos, &scan.logos_any_case) {
        findings.push(StructureFinding::LogoWrongCase);
    } else if scan.logos.is_empty() {
        findings.push(StructureFinding::LogoMissing);
    }

    if differs_by_case(&scan.screenshots, &scan.screenshots_any_case) {
        findings.push(StructureFinding::ScreenshotWrongCase);
    } else if scan.screenshots.is_empty() {
        findings.push(StructureFinding::ScreenshotMissing);
    }

    match scan.content_dirs.first() {
        None => findings.push(StructureFinding::ContentFolderMissing),
        Some(member) => {
            let content_path = root.join(member);
            if file_count(&content_path) == 0 {
                findings.push(StructureFinding::ContentFolderEmpty);
            }
            check_localflash(&content_path, &mut findings)?;
        }
    }

    for name in tables::bad_system_files() {
        if members.iter().any(|member| member.contains(name.as_str())) {
            findings.push(StructureFinding::ForbiddenFile(name.clone()));
        }
    }

    Ok(findings)
}

/// Every exact match also matches the case-insensitive rule, so differing
/// sets mean a wrong-case file exists.
fn differs_by_case(exact: &[String], any_case: &[String]) -> bool {
    exact.iter().collect::<BTreeSet<_>>() != any_case.iter().collect::<BTreeSet<_>>()
}

/// Files anywhere under `path`, directories not counted
fn file_count(path: &Path) -> usize {
    if !path.is_dir() {
        return 0;
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}

/// Flag content placed directly in `localflash` instead of one folder down,
/// and containing folders named after the most common collisions.
fn check_localflash(content_path: &Path, findings: &mut Vec<StructureFinding>) -> Result<()> {
    if !content_path.is_dir() {
        return Ok(());
    }
    let has_localflash = std::fs::read_dir(content_path)?
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_name() == "localflash");
    let localflash = content_path.join("localflash");
    if !has_localflash || !localflash.is_dir() {
        return Ok(());
    }

    let entries = std::fs::read_dir(&localflash)?.collect::<std::io::Result<Vec<_>>>()?;
    if entries.len() > 1 {
        findings.push(StructureFinding::LocalflashDirectContent);
        return Ok(());
    }
    for entry in &entries {
        if entry.path().is_file() {
            findings.push(StructureFinding::LocalflashDirectContent);
        } else if tables::common_localflash_names()
            .iter()
            .any(|common| entry.file_name() == common.as_str())
        {
            findings.push(StructureFinding::LocalflashCommonName);
        }
    }
    Ok(())
}
