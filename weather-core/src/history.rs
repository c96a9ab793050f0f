//! Search history: newest-first list of past queries, persisted as a whole
//! after every change.

use tracing::{info, warn};

use crate::{
    error::{HistoryError, LookupError},
    lookup::LookupService,
    model::{HistoryEntry, Query, WeatherSnapshot},
    storage::KeyValueStorage,
};

/// Storage slot holding the serialized history.
pub const HISTORY_KEY: &str = "history";

#[derive(Debug)]
pub struct HistoryStore {
    storage: Box<dyn KeyValueStorage>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Load the persisted history. Missing or unreadable data yields an
    /// empty list rather than an error.
    pub fn load(storage: Box<dyn KeyValueStorage>) -> Self {
        let entries = match Self::read_entries(storage.as_ref()) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable search history");
                Vec::new()
            }
        };

        info!(count = entries.len(), "Loaded search history");
        Self { storage, entries }
    }

    /// Strict variant of [`HistoryStore::load`] that reports parse and I/O failures.
    pub fn try_load(storage: Box<dyn KeyValueStorage>) -> Result<Self, HistoryError> {
        let entries = Self::read_entries(storage.as_ref())?;
        Ok(Self { storage, entries })
    }

    fn read_entries(storage: &dyn KeyValueStorage) -> Result<Vec<HistoryEntry>, HistoryError> {
        match storage.get(HISTORY_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(HistoryError::Parse),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend a new entry and persist the resulting list.
    pub fn append(
        &mut self,
        query: Query,
        searched_at: impl Into<String>,
    ) -> Result<&[HistoryEntry], HistoryError> {
        let entry = HistoryEntry::new(query, searched_at);

        let mut updated = Vec::with_capacity(self.entries.len() + 1);
        updated.push(entry);
        updated.extend(self.entries.iter().cloned());

        self.commit(updated)?;
        info!(count = self.entries.len(), "Appended search history entry");
        Ok(&self.entries)
    }

    /// Remove every entry equal to `entry`, duplicates included, and persist
    /// the resulting list.
    pub fn remove(&mut self, entry: &HistoryEntry) -> Result<&[HistoryEntry], HistoryError> {
        let updated: Vec<HistoryEntry> =
            self.entries.iter().filter(|e| *e != entry).cloned().collect();

        let removed = self.entries.len() - updated.len();
        self.commit(updated)?;
        info!(removed, count = self.entries.len(), "Removed search history entries");
        Ok(&self.entries)
    }

    /// Remove the entry at `index` and every copy of it. Returns how many
    /// entries were dropped, or `None` when `index` is out of range.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<usize>, HistoryError> {
        let Some(entry) = self.entries.get(index).cloned() else {
            return Ok(None);
        };
        let before = self.entries.len();
        let after = self.remove(&entry)?.len();
        Ok(Some(before - after))
    }

    /// Look the stored query up again. The history itself is not touched;
    /// recording the fresh search is up to the caller.
    pub async fn replay(
        &self,
        entry: &HistoryEntry,
        lookup: &LookupService,
    ) -> Result<WeatherSnapshot, LookupError> {
        lookup.lookup(&entry.query).await
    }

    /// Persist first, so a failed write leaves memory and disk in agreement.
    fn commit(&mut self, updated: Vec<HistoryEntry>) -> Result<(), HistoryError> {
        let json = serde_json::to_string(&updated).map_err(HistoryError::Serialize)?;
        self.storage.set(HISTORY_KEY, &json)?;
        self.entries = updated;
        Ok(())
    }
}
