use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Total number of ayahs in the Quran; ayah numbers run `1..=TOTAL_AYAHS`.
pub const TOTAL_AYAHS: u16 = 6236;

/// Text edition identifier understood by the verse API (e.g. `quran-simple`, `en.sahih`).
///
/// Opaque on our side: only the remote service decides whether an edition exists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Edition(String);

impl Edition {
    pub const DEFAULT: &'static str = "quran-simple";

    /// Editions offered by the presentation layer's edition menu.
    pub const KNOWN: &'static [&'static str] = &[
        "quran-simple",
        "en.transliteration",
        "id.indonesian",
        "id.muntakhab",
        "en.ahmedali",
        "en.asad",
        "en.hilali",
        "en.pickthall",
        "en.sahih",
    ];

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.iter().any(|known| *known == self.0)
    }
}

impl Default for Edition {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Edition {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Composite key identifying a verse regardless of edition.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FavoriteMark {
    pub surah_number: u16,
    pub ayah_number: u16,
}

impl FavoriteMark {
    pub fn new(surah_number: u16, ayah_number: u16) -> Self {
        Self {
            surah_number,
            ayah_number,
        }
    }
}

impl fmt::Display for FavoriteMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.surah_number, self.ayah_number)
    }
}

/// A single ayah in a given edition, flattened from the verse API envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub text: String,
    pub surah_number: u16,
    pub surah_name: String,
    pub surah_name_translation: String,
    pub ayah_number_in_surah: u16,
    pub total_ayahs_in_surah: u16,
    pub edition_name: String,
}

impl Verse {
    pub fn key(&self) -> FavoriteMark {
        FavoriteMark::new(self.surah_number, self.ayah_number_in_surah)
    }

    /// Position label, e.g. `[1] : 1 of 7`.
    pub fn reference(&self) -> String {
        format!(
            "[{}] : {} of {}",
            self.surah_number, self.ayah_number_in_surah, self.total_ayahs_in_surah
        )
    }
}

/// Prayer schedule for one location, as reported by the prayer-times API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PrayerTimes {
    /// The location string that was queried.
    pub location: String,
    pub city: String,
    pub country: String,
    pub timezone: String,
    pub qibla_direction: String,
    pub method: Option<String>,
    pub days: Vec<PrayerDay>,
}

impl PrayerTimes {
    pub fn today(&self) -> Option<&PrayerDay> {
        self.days.first()
    }
}

/// Times are kept as the service's display strings (`"4:35 am"`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PrayerDay {
    pub date_for: String,
    pub fajr: String,
    pub shurooq: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl PrayerDay {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_for, "%Y-%m-%d").ok()
    }

    /// `(name, time)` pairs in chronological order.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("Fajr", self.fajr.as_str()),
            ("Shurooq", self.shurooq.as_str()),
            ("Dhuhr", self.dhuhr.as_str()),
            ("Asr", self.asr.as_str()),
            ("Maghrib", self.maghrib.as_str()),
            ("Isha", self.isha.as_str()),
        ]
    }
}
