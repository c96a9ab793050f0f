use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::LookupError,
    model::{Query, WeatherSnapshot, format_epoch_local},
};

use super::WeatherProvider;

/// Current-weather endpoint of OpenWeather.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp_min: f64,
    temp_max: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    weather: Vec<OwWeather>,
    main: OwMain,
    dt: i64,
}

impl TryFrom<OwCurrentResponse> for WeatherSnapshot {
    type Error = LookupError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        let condition = parsed.weather.into_iter().next().ok_or_else(|| {
            LookupError::MalformedResponse("missing field `weather[0]`".to_string())
        })?;
        format_epoch_local(parsed.dt)?;

        Ok(WeatherSnapshot {
            location_name: parsed.name,
            country_code: parsed.sys.country,
            condition_main: condition.main,
            condition_description: condition.description,
            temp_min_k: parsed.main.temp_min,
            temp_max_k: parsed.main.temp_max,
            humidity_pct: parsed.main.humidity,
            observed_at_epoch_seconds: parsed.dt,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, query: &Query) -> Result<WeatherSnapshot, LookupError> {
        let q = query.provider_query();
        debug!(q = %q, "Requesting current weather from OpenWeather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("q", q.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "OpenWeather rejected the request");
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            return Err(LookupError::Provider { status_text });
        }

        parse_current(&body)
    }
}

fn parse_current(body: &str) -> Result<WeatherSnapshot, LookupError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;
    WeatherSnapshot::try_from(parsed)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
