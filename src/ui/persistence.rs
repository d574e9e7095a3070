//! Tracks messages rendered from persistent UI elements so they can be refreshed after a
//! restart.
//!
//! The record file maps a message id to the element it was rendered from. It is rewritten
//! whole on every change, under the tracker's lock. Entries that fail to parse are kept and
//! written back as they were.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serenity::all::{ChannelId, GuildId, Http, MessageId, UserId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use super::UiError;
use super::builder::RenderedElement;
use super::config::UiConfigStore;
use crate::utils::json_store;
use crate::utils::time::unix_timestamp_utc;

/// One rendered persistent message. Ids are stored as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentMessageRecord {
    pub channel_id: String,
    pub guild_id: String,
    /// `"{guild_id}_{element_name}"`
    pub ui_element_id: String,
    /// Recovered from `ui_element_id` when absent.
    #[serde(default)]
    pub element_name: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub author_id: String,
}

impl PersistentMessageRecord {
    pub fn new(
        channel_id: ChannelId,
        guild_id: GuildId,
        element_name: &str,
        author_id: UserId,
    ) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            guild_id: guild_id.to_string(),
            ui_element_id: format!("{}_{}", guild_id, element_name),
            element_name: element_name.to_string(),
            timestamp: unix_timestamp_utc(),
            author_id: author_id.to_string(),
        }
    }

    pub fn channel(&self) -> Option<ChannelId> {
        parse_id(&self.channel_id).map(ChannelId::new)
    }

    pub fn guild(&self) -> Option<GuildId> {
        parse_id(&self.guild_id).map(GuildId::new)
    }

    fn fill_element_name(&mut self) {
        if !self.element_name.is_empty() {
            return;
        }
        let prefix = format!("{}_", self.guild_id);
        let name = match self.ui_element_id.strip_prefix(&prefix) {
            Some(name) => name,
            None => self
                .ui_element_id
                .split_once('_')
                .map_or(self.ui_element_id.as_str(), |(_, name)| name),
        };
        self.element_name = name.to_string();
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

pub type RecordMap = BTreeMap<String, PersistentMessageRecord>;

#[derive(Default)]
struct Records {
    parsed: RecordMap,
    unreadable: BTreeMap<String, Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredEntry<'a> {
    Record(&'a PersistentMessageRecord),
    Raw(&'a Value),
}

impl Records {
    fn from_raw(raw: BTreeMap<String, Value>) -> Self {
        let mut records = Self::default();
        for (message_id, value) in raw {
            match serde_json::from_value::<PersistentMessageRecord>(value.clone()) {
                Ok(mut record) => {
                    record.fill_element_name();
                    records.parsed.insert(message_id, record);
                }
                Err(e) => {
                    warn!("Keeping unreadable persistent message record {}: {}", message_id, e);
                    records.unreadable.insert(message_id, value);
                }
            }
        }
        records
    }

    fn entries(&self) -> BTreeMap<&str, StoredEntry<'_>> {
        let raw = self
            .unreadable
            .iter()
            .map(|(id, value)| (id.as_str(), StoredEntry::Raw(value)));
        let parsed = self
            .parsed
            .iter()
            .map(|(id, record)| (id.as_str(), StoredEntry::Record(record)));
        raw.chain(parsed).collect()
    }
}

/// Copies an unreadable record file aside so the next save cannot lose it.
fn back_up(path: &Path) {
    let backup = path.with_extension("json.bak");
    match fs::copy(path, &backup) {
        Ok(_) => warn!("Copied unreadable {} to {}", path.display(), backup.display()),
        Err(e) => error!("Could not back up {}: {}", path.display(), e),
    }
}

/// Outcome of a reload pass, by message id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    pub refreshed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Replaces the content of an existing message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageEditor: Send + Sync {
    async fn refresh(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        rendered: &RenderedElement,
    ) -> Result<(), UiError>;
}

#[async_trait]
impl MessageEditor for Http {
    async fn refresh(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        rendered: &RenderedElement,
    ) -> Result<(), UiError> {
        let mut message = channel_id.message(self, message_id).await?;
        message.edit(self, rendered.to_edit()).await?;
        Ok(())
    }
}

pub struct PersistenceTracker {
    path: PathBuf,
    records: Mutex<Records>,
}

impl PersistenceTracker {
    /// Loads records from `path`. A missing file starts empty.
    ///
    /// A file that is not a JSON object also starts empty, after being copied to
    /// `<name>.json.bak`.
    pub fn load(path: &Path) -> Self {
        let records = match json_store::try_load_json::<BTreeMap<String, Value>>(path) {
            Ok(raw) => Records::from_raw(raw.unwrap_or_default()),
            Err(e) => {
                error!("{}, starting without persistent messages", e);
                back_up(path);
                Records::default()
            }
        };
        debug!(
            "Loaded {} persistent message records ({} unreadable) from {}",
            records.parsed.len(),
            records.unreadable.len(),
            path.display()
        );
        Self {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, records: &Records) -> Result<(), UiError> {
        json_store::save_json(&self.path, &records.entries())?;
        Ok(())
    }

    /// Stores the record for `message_id` and writes the file.
    pub fn record(
        &self,
        message_id: MessageId,
        record: PersistentMessageRecord,
    ) -> Result<(), UiError> {
        info!(
            "Tracking message {} for UI element '{}'",
            message_id, record.ui_element_id
        );
        let mut records = self.lock();
        let key = message_id.to_string();
        records.unreadable.remove(&key);
        records.parsed.insert(key, record);
        self.write(&records)
    }

    /// Removes the given message ids. Returns how many were present.
    pub fn forget(&self, message_ids: &[String]) -> Result<usize, UiError> {
        let mut records = self.lock();
        let removed = message_ids
            .iter()
            .filter(|id| {
                let parsed = records.parsed.remove(id.as_str()).is_some();
                let raw = records.unreadable.remove(id.as_str()).is_some();
                parsed || raw
            })
            .count();
        if removed > 0 {
            self.write(&records)?;
        }
        Ok(removed)
    }

    pub fn get(&self, message_id: &str) -> Option<PersistentMessageRecord> {
        self.lock().parsed.get(message_id).cloned()
    }

    /// Records that parsed. Unreadable entries are only reported by [`Self::reload`].
    pub fn records(&self) -> RecordMap {
        self.lock().parsed.clone()
    }

    /// Ids of entries kept as they were because they did not parse.
    pub fn unreadable(&self) -> Vec<String> {
        self.lock().unreadable.keys().cloned().collect()
    }

    /// Every stored entry, unreadable ones included.
    pub fn len(&self) -> usize {
        let records = self.lock();
        records.parsed.len() + records.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn save(&self) -> Result<(), UiError> {
        let records = self.lock();
        self.write(&records)
    }

    /// Re-renders every recorded message from the current configuration.
    ///
    /// Records whose ids, element, channel or message can no longer be resolved are skipped.
    /// They stay in the file until [`PersistenceTracker::forget`] removes them.
    pub async fn reload(&self, config: &UiConfigStore, editor: &dyn MessageEditor) -> ReloadReport {
        let mut report = ReloadReport::default();

        for message_id in self.unreadable() {
            warn!("Skipping unreadable persistent message record {}", message_id);
            report.skipped.push(message_id);
        }

        for (message_id, record) in self.records() {
            match refresh_record(&message_id, &record, config, editor).await {
                Ok(()) => report.refreshed.push(message_id),
                Err(e) => {
                    warn!("Skipping persistent message {}: {}", message_id, e);
                    report.skipped.push(message_id);
                }
            }
        }

        info!(
            "Reloaded {} persistent messages, skipped {}",
            report.refreshed.len(),
            report.skipped.len()
        );
        report
    }
}

async fn refresh_record(
    message_id: &str,
    record: &PersistentMessageRecord,
    config: &UiConfigStore,
    editor: &dyn MessageEditor,
) -> Result<(), UiError> {
    let invalid = || UiError::InvalidRecord(record.ui_element_id.clone());
    let message = parse_id(message_id).map(MessageId::new).ok_or_else(invalid)?;
    let channel = record.channel().ok_or_else(invalid)?;
    let guild = record.guild().ok_or_else(invalid)?;

    let element = config
        .element(guild, &record.element_name)
        .ok_or_else(|| UiError::MissingElement {
            guild_id: record.guild_id.clone(),
            name: record.element_name.clone(),
        })?;

    editor
        .refresh(channel, message, &RenderedElement::render(element))
        .await
}
