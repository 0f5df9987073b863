//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::content::{
    ContentRepository, Edition, FetchError, PrayerDay, PrayerTimes, PrayerTimesRepository, Verse,
    VerseRepository,
};

/// Ayah number the fake verse source "picks" for random fetches.
pub const FAKE_RANDOM_NUMBER: u16 = 1;

/// Al-Faatiha 1:1 in the `quran-simple` edition.
pub fn sample_verse() -> Verse {
    Verse {
        text: "In the name of Allah...".to_string(),
        surah_number: 1,
        surah_name: "Al-Faatiha".to_string(),
        surah_name_translation: "The Opening".to_string(),
        ayah_number_in_surah: 1,
        total_ayahs_in_surah: 7,
        edition_name: "Simple".to_string(),
    }
}

pub fn sample_prayer_times() -> PrayerTimes {
    PrayerTimes {
        location: "jakarta".to_string(),
        city: "Jakarta".to_string(),
        country: "Indonesia".to_string(),
        timezone: "7".to_string(),
        qibla_direction: "295.15".to_string(),
        method: Some("Muslim World League".to_string()),
        days: vec![PrayerDay {
            date_for: "2024-05-04".to_string(),
            fajr: "4:35 am".to_string(),
            shurooq: "5:50 am".to_string(),
            dhuhr: "11:50 am".to_string(),
            asr: "3:10 pm".to_string(),
            maghrib: "5:49 pm".to_string(),
            isha: "6:59 pm".to_string(),
        }],
    }
}

/// One canned reply, optionally delayed to simulate a slow network.
type Scripted<T> = (Duration, Result<T, FetchError>);

/// Plays back scripted replies in order; the last one repeats forever.
struct Script<T> {
    replies: Mutex<VecDeque<Scripted<T>>>,
}

impl<T: Clone> Script<T> {
    fn new(replies: Vec<Scripted<T>>) -> Self {
        assert!(!replies.is_empty(), "script needs at least one reply");
        Self {
            replies: Mutex::new(replies.into()),
        }
    }

    async fn next(&self) -> Result<T, FetchError> {
        let (delay, reply) = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap()
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

/// Verse source that records what it was asked for.
pub struct FakeVerseRepository {
    script: Script<Verse>,
    editions: Mutex<Vec<Edition>>,
    numbers: Mutex<Vec<u16>>,
}

impl FakeVerseRepository {
    pub fn scripted(replies: Vec<(Duration, Result<Verse, FetchError>)>) -> Self {
        Self {
            script: Script::new(replies),
            editions: Mutex::new(Vec::new()),
            numbers: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(verse: Verse) -> Self {
        Self::scripted(vec![(Duration::ZERO, Ok(verse))])
    }

    pub fn failing(err: FetchError) -> Self {
        Self::scripted(vec![(Duration::ZERO, Err(err))])
    }

    pub fn requested_editions(&self) -> Vec<Edition> {
        self.editions.lock().unwrap().clone()
    }

    pub fn requested_numbers(&self) -> Vec<u16> {
        self.numbers.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerseRepository for FakeVerseRepository {
    fn name(&self) -> &str {
        "fake-verses"
    }

    async fn fetch_verse(&self, number: u16, edition: &Edition) -> Result<Verse, FetchError> {
        self.numbers.lock().unwrap().push(number);
        self.editions.lock().unwrap().push(edition.clone());
        self.script.next().await
    }

    async fn fetch_random_verse(&self, edition: &Edition) -> Result<Verse, FetchError> {
        self.fetch_verse(FAKE_RANDOM_NUMBER, edition).await
    }
}

pub struct FakePrayerTimesRepository {
    script: Script<PrayerTimes>,
    locations: Mutex<Vec<String>>,
}

impl FakePrayerTimesRepository {
    pub fn scripted(replies: Vec<(Duration, Result<PrayerTimes, FetchError>)>) -> Self {
        Self {
            script: Script::new(replies),
            locations: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(times: PrayerTimes) -> Self {
        Self::scripted(vec![(Duration::ZERO, Ok(times))])
    }

    pub fn failing(err: FetchError) -> Self {
        Self::scripted(vec![(Duration::ZERO, Err(err))])
    }

    pub fn requested_locations(&self) -> Vec<String> {
        self.locations.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrayerTimesRepository for FakePrayerTimesRepository {
    fn name(&self) -> &str {
        "fake-prayer-times"
    }

    async fn fetch_prayer_times(&self, location: &str) -> Result<PrayerTimes, FetchError> {
        self.locations.lock().unwrap().push(location.to_string());
        self.script.next().await
    }
}

/// A repository whose both sides succeed immediately with the samples.
pub fn test_repository() -> ContentRepository {
    ContentRepository::new(
        Arc::new(FakeVerseRepository::succeeding(sample_verse())),
        Arc::new(FakePrayerTimesRepository::succeeding(sample_prayer_times())),
    )
}
