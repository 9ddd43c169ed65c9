//! End-to-end curation validation
//!
//! [`CurationValidator`] drives one submission through every stage: archive
//! reading, layout matching, metadata parsing, field rules, and image
//! encoding. Stage results land in a [`ValidationOutcome`] as the ordered,
//! curator-facing error and warning lists. The scratch directory lives
//! exactly as long as the stages need it; every exit path, early or not,
//! drops it.

use crate::archive::{self, ArchiveReadOutcome, ArchiveRefusal, ExtractedArchive};
use crate::config::Config;
use crate::error::Result;
use crate::layout::{self, LayoutScan};
use crate::meta::{self, MetaOutcome};
use crate::reference::ReferenceClient;
use crate::rules::{self, RuleContext};
use crate::types::{CurationImage, ImageKind, ValidationOutcome};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::collections::BTreeSet;
use std::path::Path;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

const MISSING_META_MESSAGE: &str =
    "Meta file is either missing or its filename is incorrect. Are you using Flashpoint Core for curating?";

/// Validates curation archives against the submission rules
///
/// One validator instance serves any number of concurrent validations and
/// shares its reference-data cache between them.
pub struct CurationValidator {
    config: Config,
    reference: ReferenceClient,
}

impl CurationValidator {
    /// Build a validator from its configuration.
    pub fn new(config: Config) -> Self {
        let reference = ReferenceClient::new(config.sources.clone(), &config.cache);
        Self { config, reference }
    }

    /// The configuration this validator runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate one curation archive end to end.
    ///
    /// Curator mistakes, up to and including an unreadable archive, come
    /// back inside the [`ValidationOutcome`].
    ///
    /// # Errors
    ///
    /// Returns an error only for engine faults: unreachable reference
    /// sources, scratch-directory failures, panicked blocking tasks.
    pub async fn validate(&self, archive_path: impl AsRef<Path>) -> Result<ValidationOutcome> {
        let archive_path = archive_path.as_ref();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        info!(path = ?archive_path, "validating curation archive");
        let outcome = archive::read_archive(
            archive_path,
            self.config.limits.max_uncompressed_bytes,
            self.config.limits.scratch_dir.as_deref(),
        )
        .await?;
        let extracted = match outcome {
            ArchiveReadOutcome::Extracted(extracted) => extracted,
            ArchiveReadOutcome::Refused(refusal) => {
                push_refusal(archive_path, &refusal, &mut errors, &mut warnings);
                return Ok(ValidationOutcome::aborted(errors, warnings));
            }
        };

        let scan = layout::scan_members(&extracted.members)?;
        if scan.nothing_located() {
            errors.push(
                "Logo, screenshot, content folder and meta not found. Is your curation structured properly?"
                    .to_string(),
            );
            return Ok(ValidationOutcome::aborted(errors, warnings));
        }

        let structure_findings = {
            let scan = scan.clone();
            let members = extracted.members.clone();
            let root = extracted.root().to_path_buf();
            spawn_blocking(move || layout::check_structure(&scan, &members, &root)).await??
        };
        errors.extend(structure_findings.iter().map(ToString::to_string));

        let mut metadata = None;
        let mut is_extreme = None;
        let mut curation_type = None;
        match self.read_meta(&scan, &extracted).await? {
            None => errors.push(MISSING_META_MESSAGE.to_string()),
            Some(MetaOutcome::Empty) => {
                errors.push("The meta file seems to be empty.".to_string());
                return Ok(ValidationOutcome::aborted(errors, warnings));
            }
            Some(MetaOutcome::Malformed) => {
                errors.push("Unable to load meta YAML file".to_string());
                return Ok(ValidationOutcome::aborted(errors, warnings));
            }
            Some(MetaOutcome::UnrecognizedName) => {
                errors.push(MISSING_META_MESSAGE.to_string());
                return Ok(ValidationOutcome::aborted(errors, warnings));
            }
            Some(MetaOutcome::Parsed(props)) => {
                let known_tags = self.reference.master_tags().await?;

                // the duplicate check is the only reason to fetch this source
                let fetched_commands = if props
                    .get("Launch Command")
                    .is_some_and(|value| !value.is_empty())
                {
                    Some(self.reference.launch_commands().await?)
                } else {
                    None
                };
                let empty_commands = BTreeSet::new();
                let launch_commands = fetched_commands.as_deref().unwrap_or(&empty_commands);

                let report = rules::check_fields(
                    &props,
                    &RuleContext {
                        known_tags: &known_tags,
                        launch_commands,
                    },
                )?;
                errors.extend(report.errors.iter().map(ToString::to_string));
                warnings.extend(report.warnings.iter().map(ToString::to_string));
                is_extreme = Some(report.is_extreme);
                curation_type = Some(report.curation_type);
                metadata = Some(props);
            }
        }

        let images = {
            let logos = scan.logos.clone();
            let screenshots = scan.screenshots.clone();
            let root = extracted.root().to_path_buf();
            spawn_blocking(move || encode_images(&logos, &screenshots, &root)).await??
        };

        info!(
            path = ?archive_path,
            errors = errors.len(),
            warnings = warnings.len(),
            "curation validation finished"
        );
        Ok(ValidationOutcome {
            errors,
            warnings,
            is_extreme,
            curation_type,
            metadata,
            images,
        })
    }

    /// Read and parse the curation's meta file; `None` when the listing has
    /// no meta member at all.
    async fn read_meta(
        &self,
        scan: &LayoutScan,
        extracted: &ExtractedArchive,
    ) -> Result<Option<MetaOutcome>> {
        let Some(member) = scan.meta_files.first() else {
            return Ok(None);
        };
        let member = member.clone();
        let path = extracted.root().join(&member);
        let outcome = spawn_blocking(move || read_meta_file(&member, &path)).await?;
        Ok(Some(outcome))
    }
}

/// Turn an archive refusal into its curator-facing message.
///
/// An oversized archive is the one refusal that warns instead of erroring:
/// nothing is known to be wrong with it, it just cannot be checked.
fn push_refusal(
    archive_path: &Path,
    refusal: &ArchiveRefusal,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    match refusal {
        ArchiveRefusal::Rar => {
            errors.push("Curations must be either .zip or .7z, not .rar.".to_string());
        }
        ArchiveRefusal::UnsupportedExtension => {
            errors.push(format!(
                "file type of file '{}' not supported",
                archive_path.display()
            ));
        }
        ArchiveRefusal::Corrupt(format) => {
            errors.push(format!(
                "There seems to be a problem with your {format} file."
            ));
        }
        ArchiveRefusal::Oversized {
            actual_bytes,
            limit_bytes,
        } => {
            warnings.push(format!(
                "The archive is too large to be validated (`{}MB/{}MB`).",
                actual_bytes / 1_000_000,
                limit_bytes / 1_000_000
            ));
        }
    }
}

fn read_meta_file(member: &str, path: &Path) -> MetaOutcome {
    match std::fs::read_to_string(path) {
        Ok(text) => meta::parse_meta_text(member, &text),
        Err(e) => {
            warn!(?path, error = %e, "failed to read meta file");
            MetaOutcome::Malformed
        }
    }
}

/// Encode curation images to base64.
///
/// The logo is attached only when exactly one exact-case logo exists; every
/// exact-case screenshot is attached.
fn encode_images(logos: &[String], screenshots: &[String], root: &Path) -> Result<Vec<CurationImage>> {
    let mut images = Vec::new();
    if let [logo] = logos {
        images.push(CurationImage {
            kind: ImageKind::Logo,
            data: encode_image(&root.join(logo))?,
        });
    }
    for screenshot in screenshots {
        images.push(CurationImage {
            kind: ImageKind::Screenshot,
            data: encode_image(&root.join(screenshot))?,
        });
    }
    Ok(images)
}

fn encode_image(path: &Path) -> Result<String> {
    debug!(?path, "encoding image to base64");
    let bytes = std::fs::read(path)?;
    Ok(STANDARD.encode(bytes))
}
