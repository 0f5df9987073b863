//! muslimsalat.com prayer-times client.
//!
//! `GET {base_url}/{location}.json?key={api_key}` answers with HTTP 200 even
//! for unknown locations; success is signalled in-band by `status_valid == 1`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use super::alquran_cloud::trim_base;
use crate::content::{FetchError, PrayerDay, PrayerTimes, PrayerTimesRepository};

pub const DEFAULT_BASE_URL: &str = "https://muslimsalat.com";

// ============================================================================
// muslimsalat.com Response Types
// ============================================================================

#[derive(Deserialize, Debug)]
struct ScheduleResponse {
    #[serde(default)]
    query: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    country: String,
    /// Sent as a string or a number depending on the location.
    #[serde(default)]
    timezone: Value,
    #[serde(default)]
    qibla_direction: Value,
    #[serde(default)]
    prayer_method_name: Option<String>,
    #[serde(default)]
    items: Vec<PrayerDay>,
    status_valid: u8,
    #[serde(default)]
    status_description: Option<String>,
}

/// Renders a scalar JSON value without quotes; null becomes empty.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parses a response body into `PrayerTimes`, rejecting in-band failures.
fn parse_schedule(location: &str, body: &str) -> Result<PrayerTimes, FetchError> {
    let response: ScheduleResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if response.status_valid != 1 {
        let description = response
            .status_description
            .unwrap_or_else(|| "invalid status".to_string());
        return Err(FetchError::Decode(description));
    }
    if response.items.is_empty() {
        return Err(FetchError::Decode("no prayer times in response".to_string()));
    }

    let location = if response.query.is_empty() {
        location.to_string()
    } else {
        response.query
    };

    Ok(PrayerTimes {
        location,
        city: response.city,
        country: response.country,
        timezone: scalar_to_string(&response.timezone),
        qibla_direction: scalar_to_string(&response.qibla_direction),
        method: response.prayer_method_name,
        days: response.items,
    })
}

// ============================================================================
// Client Implementation
// ============================================================================

pub struct MuslimSalatClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl MuslimSalatClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: trim_base(base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())),
            client: reqwest::Client::new(),
        }
    }

    /// Like `new`, but every request fails with `FetchError::Network` after `timeout`.
    pub fn with_timeout(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            client,
            ..Self::new(api_key, base_url)
        }
    }

    /// Builds the request URL, percent-encoding the location as one path segment.
    fn schedule_url(&self, location: &str) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| FetchError::Network(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Network(format!("base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(&format!("{location}.json"));
        if let Some(ref key) = self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

#[async_trait]
impl PrayerTimesRepository for MuslimSalatClient {
    fn name(&self) -> &str {
        "muslimsalat.com"
    }

    async fn fetch_prayer_times(&self, location: &str) -> Result<PrayerTimes, FetchError> {
        let url = self.schedule_url(location)?;
        info!("Fetching prayer times for '{}'", location);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        debug!("muslimsalat.com response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("muslimsalat.com error: {} - {}", status, err_body);
            return Err(FetchError::Network(format!("HTTP {status}: {err_body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let times = parse_schedule(location, &body)?;
        debug!(
            "Received {} day(s) for {}, {}",
            times.days.len(),
            times.city,
            times.country
        );
        Ok(times)
    }
}
