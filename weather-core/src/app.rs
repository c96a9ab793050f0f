//! Explicit application state: the current result plus the two services.

use chrono::{DateTime, Local};
use tracing::info;

use crate::{
    error::AppError,
    history::HistoryStore,
    lookup::LookupService,
    model::{HistoryEntry, Query, WeatherSnapshot, format_display_time},
};

#[derive(Debug)]
pub struct WeatherApp {
    lookup: LookupService,
    history: HistoryStore,
    last_result: Option<WeatherSnapshot>,
}

impl WeatherApp {
    pub fn new(lookup: LookupService, history: HistoryStore) -> Self {
        Self { lookup, history, last_result: None }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn last_result(&self) -> Option<&WeatherSnapshot> {
        self.last_result.as_ref()
    }

    /// Drop the displayed result.
    pub fn reset(&mut self) {
        self.last_result = None;
    }

    /// Submit a query, recording it in history on success.
    pub async fn search(&mut self, query: Query) -> Result<&WeatherSnapshot, AppError> {
        self.search_at(query, Local::now()).await
    }

    pub async fn search_at(
        &mut self,
        query: Query,
        now: DateTime<Local>,
    ) -> Result<&WeatherSnapshot, AppError> {
        let snapshot = self.lookup.lookup(&query).await?;
        self.record(query, snapshot, now)
    }

    /// Look up the entry at `index` again; success adds a fresh entry.
    pub async fn replay(&mut self, index: usize) -> Result<&WeatherSnapshot, AppError> {
        self.replay_at(index, Local::now()).await
    }

    pub async fn replay_at(
        &mut self,
        index: usize,
        now: DateTime<Local>,
    ) -> Result<&WeatherSnapshot, AppError> {
        let entry = self.history.get(index).cloned().ok_or(AppError::NoSuchEntry(index))?;
        info!(query = %entry.query, searched_at = %entry.searched_at, "Replaying search");

        let snapshot = self.history.replay(&entry, &self.lookup).await?;
        self.record(entry.query, snapshot, now)
    }

    /// Remove the entry at `index` together with every identical copy.
    /// Returns how many entries were dropped.
    pub fn remove(&mut self, index: usize) -> Result<usize, AppError> {
        self.history.remove_at(index)?.ok_or(AppError::NoSuchEntry(index))
    }

    fn record(
        &mut self,
        query: Query,
        snapshot: WeatherSnapshot,
        now: DateTime<Local>,
    ) -> Result<&WeatherSnapshot, AppError> {
        self.history.append(query, format_display_time(&now))?;
        Ok(&*self.last_result.insert(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::LookupError,
        provider::WeatherProvider,
        storage::MemoryStorage,
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    /// Succeeds for every city except "Atlantis".
    #[derive(Debug, Default)]
    struct FakeProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_weather(&self, query: &Query) -> Result<WeatherSnapshot, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query.city_name == "Atlantis" {
                return Err(LookupError::Provider { status_text: "Not Found".into() });
            }
            Ok(WeatherSnapshot {
                location_name: query.city_name.clone(),
                country_code: query.country_code.clone(),
                condition_main: "Clear".into(),
                condition_description: "clear sky".into(),
                temp_min_k: 280.15,
                temp_max_k: 290.15,
                humidity_pct: 50,
                observed_at_epoch_seconds: 1_700_000_000,
            })
        }
    }

    fn app() -> (WeatherApp, Arc<FakeProvider>) {
        let provider = Arc::new(FakeProvider::default());
        let lookup = LookupService::new(Box::new(provider.clone()));
        let history = HistoryStore::load(Box::new(MemoryStorage::new()));
        (WeatherApp::new(lookup, history), provider)
    }

    fn at(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn successful_search_records_history_and_result() {
        let (mut app, _) = app();

        let snapshot = app.search_at(Query::new("Singapore", "SG"), at(9)).await.unwrap();
        assert_eq!(snapshot.location_display(), "Singapore, SG");

        assert_eq!(app.history().len(), 1);
        assert_eq!(app.history()[0].searched_at, "2024-01-15 09:00 AM");
        assert!(app.last_result().is_some());
    }

    #[tokio::test]
    async fn failed_search_leaves_history_untouched() {
        let (mut app, _) = app();
        app.search_at(Query::new("Singapore", "SG"), at(9)).await.unwrap();

        let err = app.search_at(Query::new("Atlantis", "GR"), at(10)).await.unwrap_err();
        assert_eq!(err.user_message(), "Not Found");
        assert_eq!(app.history().len(), 1);
        assert_eq!(app.last_result().map(|s| s.location_name.as_str()), Some("Singapore"));
    }

    #[tokio::test]
    async fn validation_failure_skips_provider_and_history() {
        let (mut app, provider) = app();

        let err = app.search(Query::new("", "SG")).await.unwrap_err();
        assert!(matches!(err, AppError::Lookup(LookupError::Validation)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(app.history().is_empty());
    }

    #[tokio::test]
    async fn replay_adds_a_new_entry_and_keeps_the_old_one() {
        let (mut app, provider) = app();
        app.search_at(Query::new("Singapore", "SG"), at(9)).await.unwrap();
        app.search_at(Query::new("Tokyo", "JP"), at(10)).await.unwrap();

        let snapshot = app.replay_at(1, at(11)).await.unwrap();
        assert_eq!(snapshot.location_name, "Singapore");

        let rows: Vec<_> = app
            .history()
            .iter()
            .map(|e| (e.query.city_name.as_str(), e.searched_at.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("Singapore", "2024-01-15 11:00 AM"),
                ("Tokyo", "2024-01-15 10:00 AM"),
                ("Singapore", "2024-01-15 09:00 AM"),
            ]
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn remove_collapses_identical_entries() {
        let (mut app, _) = app();
        app.search_at(Query::new("Singapore", "SG"), at(9)).await.unwrap();
        app.search_at(Query::new("Tokyo", "JP"), at(10)).await.unwrap();
        app.search_at(Query::new("Singapore", "SG"), at(9)).await.unwrap();

        assert_eq!(app.remove(0).unwrap(), 2);
        assert_eq!(app.history().len(), 1);
        assert_eq!(app.history()[0].query.city_name, "Tokyo");
    }

    #[tokio::test]
    async fn out_of_range_index_is_reported() {
        let (mut app, _) = app();
        assert!(matches!(app.remove(0), Err(AppError::NoSuchEntry(0))));
        assert!(matches!(app.replay(3).await, Err(AppError::NoSuchEntry(3))));
    }

    #[tokio::test]
    async fn reset_clears_displayed_result() {
        let (mut app, _) = app();
        app.search(Query::new("Singapore", "SG")).await.unwrap();
        app.reset();
        assert!(app.last_result().is_none());
        assert_eq!(app.history().len(), 1);
    }
}
