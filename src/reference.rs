//! Reference data for the field rules
//!
//! The master tag list and the known launch commands live outside the
//! engine: two JSON endpoints, an operator-maintained tag file on disk, and
//! a wiki page that only exists as HTML. Each source is cached behind its
//! own TTL. A slot's lock is held across the refresh, so concurrent
//! validations share one fetch instead of stampeding an expired source.

use crate::config::{CacheConfig, SourcesConfig};
use crate::error::{Error, Result};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// One cached reference source
struct CacheSlot<T> {
    ttl: Duration,
    state: Mutex<Option<CachedEntry<T>>>,
}

struct CachedEntry<T> {
    value: Arc<T>,
    fetched_at: Instant,
}

impl<T> CacheSlot<T> {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Return the cached value, refreshing it first when the TTL has passed.
    ///
    /// A failed refresh leaves the slot as it was, so the next caller tries
    /// again.
    async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut state = self.state.lock().await;
        if let Some(entry) = state.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&entry.value));
            }
        }
        let value = Arc::new(refresh().await?);
        *state = Some(CachedEntry {
            value: Arc::clone(&value),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }
}

#[derive(Deserialize)]
struct LaunchCommandsPayload {
    launch_commands: Vec<String>,
}

#[derive(Deserialize)]
struct TagsPayload {
    tags: Vec<String>,
}

/// Cached client for every reference source the field rules need
pub struct ReferenceClient {
    client: reqwest::Client,
    sources: SourcesConfig,
    launch_commands: CacheSlot<BTreeSet<String>>,
    remote_tags: CacheSlot<Vec<String>>,
    local_tags: CacheSlot<Vec<String>>,
    wiki_tags: CacheSlot<Vec<String>>,
}

impl ReferenceClient {
    /// Build a client over the configured sources and TTLs.
    pub fn new(sources: SourcesConfig, cache: &CacheConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            launch_commands: CacheSlot::new(cache.launch_commands_ttl),
            remote_tags: CacheSlot::new(cache.remote_tags_ttl),
            local_tags: CacheSlot::new(cache.local_tags_ttl),
            wiki_tags: CacheSlot::new(cache.wiki_tags_ttl),
            sources,
        }
    }

    /// Launch commands already present in the master database.
    pub async fn launch_commands(&self) -> Result<Arc<BTreeSet<String>>> {
        self.launch_commands
            .get_or_refresh(|| {
                fetch_launch_commands(&self.client, &self.sources.launch_command_api_url)
            })
            .await
    }

    /// The master tag list: remote tags, the local tag file and the wiki,
    /// unioned.
    pub async fn master_tags(&self) -> Result<BTreeSet<String>> {
        let remote = self
            .remote_tags
            .get_or_refresh(|| fetch_remote_tags(&self.client, &self.sources.tag_api_url))
            .await?;
        let local = self
            .local_tags
            .get_or_refresh(|| load_local_tags(&self.sources.local_tag_file))
            .await?;
        let wiki = self
            .wiki_tags
            .get_or_refresh(|| fetch_wiki_tags(&self.client, &self.sources.wiki_tags_url))
            .await?;

        let mut tags = BTreeSet::new();
        for source in [remote.as_slice(), local.as_slice(), wiki.as_slice()] {
            tags.extend(source.iter().cloned());
        }
        Ok(tags)
    }
}

async fn fetch_launch_commands(client: &reqwest::Client, url: &str) -> Result<BTreeSet<String>> {
    debug!(url, "fetching launch commands");
    let payload: LaunchCommandsPayload = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(payload.launch_commands.into_iter().collect())
}

async fn fetch_remote_tags(client: &reqwest::Client, url: &str) -> Result<Vec<String>> {
    debug!(url, "fetching remote tags");
    let payload: TagsPayload = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(payload.tags)
}

async fn load_local_tags(path: &Path) -> Result<Vec<String>> {
    debug!(?path, "reading local tag file");
    let text = tokio::fs::read_to_string(path).await?;
    let payload: TagsPayload = serde_json::from_str(&text)?;
    Ok(payload.tags)
}

async fn fetch_wiki_tags(client: &reqwest::Client, url: &str) -> Result<Vec<String>> {
    debug!(url, "scraping wiki tags");
    let body = client.get(url).send().await?.error_for_status()?.text().await?;
    parse_wiki_tags(&body)
}

/// Pull tag names out of the wiki's HTML tables.
///
/// One tag per row: the first link's text when the row has a link, the first
/// cell's text otherwise. Header-only rows carry no `td` and are skipped.
fn parse_wiki_tags(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let row_rule = selector("table tr")?;
    let cell_rule = selector("td")?;
    let link_rule = selector("a")?;

    let mut tags = Vec::new();
    for row in document.select(&row_rule) {
        let Some(first_cell) = row.select(&cell_rule).next() else {
            continue;
        };
        let text = match row.select(&link_rule).next() {
            Some(link) => link.text().next().unwrap_or_default(),
            None => first_cell.text().next().unwrap_or_default(),
        };
        let tag = text.trim();
        if !tag.is_empty() {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

fn selector(rule: &str) -> Result<Selector> {
    Selector::parse(rule).map_err(|e| Error::Scrape(e.to_string()))
}
