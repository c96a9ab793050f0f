use anyhow::Result;
use inquire::{InquireError, Select, Text};
use std::fmt;
use weather_core::{AppError, Query, WeatherApp, WeatherSnapshot};

use crate::render;

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Search,
    Replay,
    Remove,
    Reset,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 5] =
        [MenuItem::Search, MenuItem::Replay, MenuItem::Remove, MenuItem::Reset, MenuItem::Quit];
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuItem::Search => "Search",
            MenuItem::Replay => "Search again from history",
            MenuItem::Remove => "Remove from history",
            MenuItem::Reset => "Reset",
            MenuItem::Quit => "Quit",
        })
    }
}

/// Run the menu loop until the user quits. Lookup and storage failures are
/// reported and the loop carries on.
pub async fn run(mut app: WeatherApp) -> Result<()> {
    println!("Today's Weather\n");
    println!("{}\n", render::history(app.history()));

    loop {
        let choice = match Select::new("What next?", MenuItem::ALL.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let outcome = match choice {
            MenuItem::Search => match prompt_query() {
                Ok(Some(query)) => app.search(query).await.and_then(show),
                Ok(None) => continue,
                Err(e) => return Err(e.into()),
            },
            MenuItem::Replay | MenuItem::Remove => {
                let Some(index) = pick_entry(&app, &choice.to_string())? else {
                    continue;
                };
                if matches!(choice, MenuItem::Replay) {
                    app.replay(index).await.and_then(show)
                } else {
                    app.remove(index).map(render::removed)
                }
            }
            MenuItem::Reset => {
                app.reset();
                Ok("Cleared.".to_string())
            }
            MenuItem::Quit => break,
        };

        match outcome {
            Ok(text) => println!("\n{text}\n"),
            Err(e) => {
                tracing::debug!(error = ?e, "Action failed");
                eprintln!("\n{}\n", e.user_message());
            }
        }
        println!("{}\n", render::history(app.history()));
    }

    Ok(())
}

/// `Ok(None)` when the user backs out with Esc.
fn prompt_query() -> Result<Option<Query>, InquireError> {
    let city = match Text::new("City Name:").with_placeholder("Singapore").prompt() {
        Ok(city) => city,
        Err(InquireError::OperationCanceled) => return Ok(None),
        Err(e) => return Err(e),
    };
    let country = match Text::new("Country Code:").with_placeholder("SG").prompt() {
        Ok(country) => country,
        Err(InquireError::OperationCanceled) => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(Some(Query::new(city, country)))
}

fn pick_entry(app: &WeatherApp, title: &str) -> Result<Option<usize>> {
    if app.history().is_empty() {
        println!("\nNo searches yet.\n");
        return Ok(None);
    }

    let rows: Vec<String> = app.history().iter().map(render::history_row).collect();
    match Select::new(title, rows).raw_prompt() {
        Ok(picked) => Ok(Some(picked.index)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn show(snapshot: &WeatherSnapshot) -> Result<String, AppError> {
    Ok(render::snapshot(snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_lists_every_action_once() {
        let labels: Vec<String> = MenuItem::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels.len(), 5);
        assert!(labels.contains(&"Reset".to_string()));
    }
}
