use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use weather_core::{
    AppError, Config, FileStorage, HistoryStore, LookupService, Query, WeatherApp,
    provider_from_config,
};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Today's weather, with search history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key (and optionally a custom endpoint).
    Configure,

    /// Show current weather for a city and record the search.
    Show {
        /// City name, e.g. "Singapore".
        city: String,

        /// Country code, e.g. "SG".
        country: String,
    },

    /// List, replay or remove past searches.
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Menu-driven session: search, replay, remove, reset.
    Interactive,
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List past searches, newest first.
    List,

    /// Search again for the entry at POSITION (as shown by `history list`).
    Replay { position: usize },

    /// Remove the entry at POSITION and every identical copy of it.
    Remove { position: usize },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, country } => {
                let query = validated_query(city, country)?;
                let mut app = open_app()?;
                let snapshot = app.search(query).await.map_err(user_facing)?;
                println!("{}", render::snapshot(snapshot).map_err(|e| user_facing(e.into()))?);
                Ok(())
            }
            Command::History { action } => match action.unwrap_or(HistoryAction::List) {
                HistoryAction::List => {
                    let store = open_history(&load_config()?)?;
                    println!("{}", render::history(store.entries()));
                    Ok(())
                }
                HistoryAction::Replay { position } => {
                    let mut app = open_app()?;
                    let snapshot = app.replay(to_index(position)?).await.map_err(user_facing)?;
                    println!("{}", render::snapshot(snapshot).map_err(|e| user_facing(e.into()))?);
                    Ok(())
                }
                HistoryAction::Remove { position } => {
                    let mut store = open_history(&load_config()?)?;
                    let index = to_index(position)?;
                    let removed = store
                        .remove_at(index)?
                        .ok_or_else(|| user_facing(AppError::NoSuchEntry(index)))?;
                    println!("{}\n", render::removed(removed));
                    println!("{}", render::history(store.entries()));
                    Ok(())
                }
            },
            Command::Interactive => interactive::run(open_app()?).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("API key prompt was cancelled")?;
    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    cfg.set_api_key(api_key);

    let base_url = Text::new("Custom endpoint (leave empty for the default):")
        .with_default(cfg.base_url.as_deref().unwrap_or(""))
        .prompt()
        .context("Endpoint prompt was cancelled")?;
    cfg.set_base_url(Some(base_url));

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    Ok(Config::load()?.with_env_overrides(|name| std::env::var(name).ok()))
}

fn open_history(cfg: &Config) -> anyhow::Result<HistoryStore> {
    Ok(HistoryStore::load(Box::new(FileStorage::new(cfg.history_dir()?))))
}

fn open_app() -> anyhow::Result<WeatherApp> {
    let cfg = load_config()?;
    let lookup = LookupService::new(provider_from_config(&cfg)?);
    Ok(WeatherApp::new(lookup, open_history(&cfg)?))
}

/// Rejects empty input before any configuration or provider is touched.
fn validated_query(city: String, country: String) -> anyhow::Result<Query> {
    let query = Query::new(city, country);
    query.validate().map_err(|e| user_facing(e.into()))?;
    Ok(query)
}

/// Positions are shown starting at 1.
fn to_index(position: usize) -> anyhow::Result<usize> {
    position.checked_sub(1).ok_or_else(|| anyhow!("Positions start at 1"))
}

fn user_facing(err: AppError) -> anyhow::Error {
    tracing::debug!(error = ?err, "Command failed");
    anyhow!(err.user_message())
}
