//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The lookup service over the OpenWeather current-weather endpoint
//! - The persisted, newest-first search history with replay and removal
//! - Shared domain models (queries, snapshots, history entries)
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod history;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod storage;

pub use app::WeatherApp;
pub use config::Config;
pub use error::{AppError, HistoryError, LookupError};
pub use history::{HISTORY_KEY, HistoryStore};
pub use lookup::LookupService;
pub use model::{HistoryEntry, Query, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
