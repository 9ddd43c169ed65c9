//! Configuration types for curation-validator

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Archive-size and scratch-space limits
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum total uncompressed archive size before validation is skipped
    /// with a warning (default: 50 GB)
    #[serde(default = "default_max_uncompressed_bytes")]
    pub max_uncompressed_bytes: u64,

    /// Parent directory for scratch extraction directories
    /// (None = system temp dir)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_uncompressed_bytes: default_max_uncompressed_bytes(),
            scratch_dir: None,
        }
    }
}

/// Reference-data source locations
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Remote tag registry endpoint, JSON `{"tags": [...]}`
    #[serde(default = "default_tag_api_url")]
    pub tag_api_url: String,

    /// Remote launch-command registry endpoint, JSON `{"launch_commands": [...]}`
    #[serde(default = "default_launch_command_api_url")]
    pub launch_command_api_url: String,

    /// Wiki page whose tables are scraped for additional tags
    #[serde(default = "default_wiki_tags_url")]
    pub wiki_tags_url: String,

    /// Operator-maintained local tag file, JSON `{"tags": [...]}`
    #[serde(default = "default_local_tag_file")]
    pub local_tag_file: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            tag_api_url: default_tag_api_url(),
            launch_command_api_url: default_launch_command_api_url(),
            wiki_tags_url: default_wiki_tags_url(),
            local_tag_file: default_local_tag_file(),
        }
    }
}

/// Time-to-live per reference-data source
///
/// Each source is cached independently; an expired entry is refetched on the
/// next validation that needs it, never in the background.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched launch-command set stays fresh (default: 600s)
    #[serde(default = "default_launch_commands_ttl", with = "duration_serde")]
    pub launch_commands_ttl: Duration,

    /// How long a fetched remote tag set stays fresh (default: 600s)
    #[serde(default = "default_remote_tags_ttl", with = "duration_serde")]
    pub remote_tags_ttl: Duration,

    /// How long the local tag file is trusted before re-reading (default: 3600s)
    #[serde(default = "default_local_tags_ttl", with = "duration_serde")]
    pub local_tags_ttl: Duration,

    /// How long a scraped wiki tag table stays fresh (default: 60s)
    #[serde(default = "default_wiki_tags_ttl", with = "duration_serde")]
    pub wiki_tags_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            launch_commands_ttl: default_launch_commands_ttl(),
            remote_tags_ttl: default_remote_tags_ttl(),
            local_tags_ttl: default_local_tags_ttl(),
            wiki_tags_ttl: default_wiki_tags_ttl(),
        }
    }
}

/// Main configuration for [`CurationValidator`](crate::CurationValidator)
///
/// Fields are organized into logical sub-configs:
/// - [`limits`](LimitsConfig): size ceiling, scratch directory
/// - [`sources`](SourcesConfig): reference-data endpoints and files
/// - [`cache`](CacheConfig): per-source TTLs
///
/// All sub-config fields are flattened for serialization, so the JSON format
/// stays flat (no nesting). Every field has a default matching the reference
/// deployment; a partial or empty config file works.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Size and scratch-space limits
    #[serde(flatten)]
    pub limits: LimitsConfig,

    /// Reference-data source locations
    #[serde(flatten)]
    pub sources: SourcesConfig,

    /// Per-source cache TTLs
    #[serde(flatten)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing keys fall back to their defaults, so a partial file is fine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })
    }
}

fn default_max_uncompressed_bytes() -> u64 {
    50 * 1000 * 1000 * 1000
}

fn default_tag_api_url() -> String {
    "https://bluebot.unstable.life/tags".to_string()
}

fn default_launch_command_api_url() -> String {
    "https://bluebot.unstable.life/launch-commands".to_string()
}

fn default_wiki_tags_url() -> String {
    "https://bluemaxima.org/flashpoint/datahub/Tags".to_string()
}

fn default_local_tag_file() -> PathBuf {
    PathBuf::from("data/category_tags.json")
}

fn default_launch_commands_ttl() -> Duration {
    Duration::from_secs(600)
}

fn default_remote_tags_ttl() -> Duration {
    Duration::from_secs(600)
}

fn default_local_tags_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_wiki_tags_ttl() -> Duration {
    Duration::from_secs(60)
}

// Duration serialization helper (seconds as integer)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
