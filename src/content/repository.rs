use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::types::{Edition, PrayerTimes, Verse};

/// Errors that can occur while fetching remote content.
/// Neither kind is retried; a retry is the caller issuing the same call again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No connectivity, timeout, or a non-2xx response.
    Network(String),
    /// The response body did not have the expected shape.
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Source of Quranic verses.
#[async_trait]
pub trait VerseRepository: Send + Sync {
    /// Returns the name of the backing service.
    fn name(&self) -> &str;

    /// Fetches the ayah with the given global number (`1..=6236`) in the given edition.
    async fn fetch_verse(&self, number: u16, edition: &Edition) -> Result<Verse, FetchError>;

    /// Fetches a randomly chosen ayah in the given edition.
    async fn fetch_random_verse(&self, edition: &Edition) -> Result<Verse, FetchError>;
}

/// Source of prayer schedules.
#[async_trait]
pub trait PrayerTimesRepository: Send + Sync {
    /// Returns the name of the backing service.
    fn name(&self) -> &str;

    async fn fetch_prayer_times(&self, location: &str) -> Result<PrayerTimes, FetchError>;
}

/// The one repository handle the rest of the app holds.
///
/// Verses and prayer times come from unrelated services with independent
/// failure domains; each side can be swapped for a fake on its own.
#[derive(Clone)]
pub struct ContentRepository {
    verses: Arc<dyn VerseRepository>,
    prayer_times: Arc<dyn PrayerTimesRepository>,
}

impl ContentRepository {
    pub fn new(
        verses: Arc<dyn VerseRepository>,
        prayer_times: Arc<dyn PrayerTimesRepository>,
    ) -> Self {
        Self {
            verses,
            prayer_times,
        }
    }

    pub async fn fetch_random_verse(&self, edition: &Edition) -> Result<Verse, FetchError> {
        self.verses.fetch_random_verse(edition).await
    }

    pub async fn fetch_verse(&self, number: u16, edition: &Edition) -> Result<Verse, FetchError> {
        self.verses.fetch_verse(number, edition).await
    }

    pub async fn fetch_prayer_times(&self, location: &str) -> Result<PrayerTimes, FetchError> {
        self.prayer_times.fetch_prayer_times(location).await
    }

    /// `(verse service, prayer-times service)` names, for logging.
    pub fn source_names(&self) -> (&str, &str) {
        (self.verses.name(), self.prayer_times.name())
    }
}
