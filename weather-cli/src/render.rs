use weather_core::{HistoryEntry, LookupError, WeatherSnapshot};

pub fn snapshot(s: &WeatherSnapshot) -> Result<String, LookupError> {
    let time = s.observed_at_display()?;

    Ok(format!(
        "{}\n{}\n  Description: {}\n  Temperature: {}\n  Humidity:    {}\n  Time:        {}",
        s.location_display(),
        s.condition_main,
        s.condition_description,
        s.temperature_range_display(),
        s.humidity_pct,
        time,
    ))
}

pub fn removed(n: usize) -> String {
    format!("Removed {n} entr{}", if n == 1 { "y" } else { "ies" })
}

/// One history row, as shown in lists and pickers.
pub fn history_row(entry: &HistoryEntry) -> String {
    format!("{}  (Date Search: {})", entry.query, entry.searched_at)
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "Search History\n  No searches yet.".to_string();
    }

    let width = entries.len().to_string().len();
    let rows: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {:>width$}. {}", i + 1, history_row(e)))
        .collect();

    format!("Search History\n{}", rows.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::Query;

    #[test]
    fn snapshot_shows_celsius_range() {
        let s = WeatherSnapshot {
            location_name: "Singapore".into(),
            country_code: "SG".into(),
            condition_main: "Clouds".into(),
            condition_description: "broken clouds".into(),
            temp_min_k: 280.15,
            temp_max_k: 290.15,
            humidity_pct: 79,
            observed_at_epoch_seconds: 1_700_000_000,
        };
        let out = snapshot(&s).unwrap();

        assert!(out.starts_with("Singapore, SG\nClouds\n"));
        assert!(out.contains("Temperature: 7.00°C ~ 17.00°C"));
        assert!(out.contains("Humidity:    79"));
    }

    #[test]
    fn snapshot_with_unrepresentable_time_is_an_error() {
        let s = WeatherSnapshot {
            location_name: "Singapore".into(),
            country_code: "SG".into(),
            condition_main: "Clouds".into(),
            condition_description: "broken clouds".into(),
            temp_min_k: 280.15,
            temp_max_k: 290.15,
            humidity_pct: 79,
            observed_at_epoch_seconds: i64::MAX,
        };
        assert!(matches!(snapshot(&s), Err(LookupError::MalformedResponse(_))));
    }

    #[test]
    fn history_is_numbered_from_one() {
        let entries = vec![
            HistoryEntry::new(Query::new("Tokyo", "JP"), "2024-01-15 10:00 AM"),
            HistoryEntry::new(Query::new("Singapore", "SG"), "2024-01-15 09:00 AM"),
        ];
        let out = history(&entries);

        assert!(out.contains("1. Tokyo, JP  (Date Search: 2024-01-15 10:00 AM)"));
        assert!(out.contains("2. Singapore, SG  (Date Search: 2024-01-15 09:00 AM)"));
    }

    #[test]
    fn removal_message_pluralizes() {
        assert_eq!(removed(1), "Removed 1 entry");
        assert_eq!(removed(3), "Removed 3 entries");
    }

    #[test]
    fn empty_history_has_placeholder() {
        assert!(history(&[]).contains("No searches yet."));
    }
}
