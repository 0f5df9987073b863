//! alquran.cloud verse client.
//!
//! `GET {base_url}/ayah/{number}/{edition}` returns an envelope of the form
//! `{ code, status, data: { text, numberInSurah, surah: {..}, edition: {..} } }`.
//! Only the fields we display are deserialized; everything else is ignored.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use rand::Rng;
use serde::Deserialize;

use crate::content::{Edition, FetchError, TOTAL_AYAHS, Verse, VerseRepository};

pub const DEFAULT_BASE_URL: &str = "https://api.alquran.cloud/v1";

// ============================================================================
// alquran.cloud Response Types
// ============================================================================

#[derive(Deserialize, Debug)]
struct AyahEnvelope {
    data: AyahData,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AyahData {
    text: String,
    number_in_surah: u16,
    surah: SurahInfo,
    edition: EditionInfo,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SurahInfo {
    number: u16,
    english_name: String,
    english_name_translation: String,
    number_of_ayahs: u16,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EditionInfo {
    english_name: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

impl From<AyahData> for Verse {
    fn from(data: AyahData) -> Self {
        Verse {
            text: data.text,
            surah_number: data.surah.number,
            surah_name: data.surah.english_name,
            surah_name_translation: data.surah.english_name_translation,
            ayah_number_in_surah: data.number_in_surah,
            total_ayahs_in_surah: data.surah.number_of_ayahs,
            edition_name: data.edition.english_name,
        }
    }
}

/// Parses a response body into a `Verse`.
fn parse_ayah(body: &str) -> Result<Verse, FetchError> {
    let envelope: AyahEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(envelope.data.into())
}

/// Picks a global ayah number in `1..=TOTAL_AYAHS`.
fn random_ayah_number() -> u16 {
    rand::thread_rng().gen_range(1..=TOTAL_AYAHS)
}

// ============================================================================
// Client Implementation
// ============================================================================

pub struct AlQuranCloudClient {
    base_url: String,
    client: reqwest::Client,
}

impl AlQuranCloudClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: trim_base(base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())),
            client: reqwest::Client::new(),
        }
    }

    /// Like `new`, but every request fails with `FetchError::Network` after `timeout`.
    pub fn with_timeout(base_url: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            base_url: trim_base(base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())),
            client,
        }
    }

    fn ayah_url(&self, number: u16, edition: &Edition) -> String {
        format!("{}/ayah/{}/{}", self.base_url, number, edition)
    }
}

pub(crate) fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[async_trait]
impl VerseRepository for AlQuranCloudClient {
    fn name(&self) -> &str {
        "alquran.cloud"
    }

    async fn fetch_verse(&self, number: u16, edition: &Edition) -> Result<Verse, FetchError> {
        let url = self.ayah_url(number, edition);
        info!("Fetching ayah {} (edition={})", number, edition);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        debug!("alquran.cloud response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("alquran.cloud error: {} - {}", status, err_body);
            return Err(FetchError::Network(format!("HTTP {status}: {err_body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let verse = parse_ayah(&body)?;
        debug!("Received {} ({})", verse.reference(), verse.edition_name);
        Ok(verse)
    }

    async fn fetch_random_verse(&self, edition: &Edition) -> Result<Verse, FetchError> {
        let number = random_ayah_number();
        self.fetch_verse(number, edition).await
    }
}
