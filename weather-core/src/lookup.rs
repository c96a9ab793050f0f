//! The lookup service: validation, then at most one provider request in
//! flight at a time.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    error::LookupError,
    model::{Query, WeatherSnapshot},
    provider::WeatherProvider,
};

#[derive(Debug)]
pub struct LookupService {
    provider: Box<dyn WeatherProvider>,
    in_flight: Mutex<()>,
}

impl LookupService {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider, in_flight: Mutex::new(()) }
    }

    /// Look up current weather for `query`.
    ///
    /// Empty input fails with [`LookupError::Validation`] before any request
    /// is made. A call made while another lookup is still running is
    /// rejected with [`LookupError::Busy`] rather than queued.
    pub async fn lookup(&self, query: &Query) -> Result<WeatherSnapshot, LookupError> {
        query.validate()?;

        let _guard = self.in_flight.try_lock().map_err(|_| {
            debug!(%query, "Rejecting lookup while another is in flight");
            LookupError::Busy
        })?;

        let result = self.provider.current_weather(query).await;
        if let Err(e) = &result {
            warn!(%query, error = %e, "Weather lookup failed");
        }
        result
    }
}
