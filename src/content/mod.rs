pub mod providers;
pub mod repository;
pub mod types;

pub use providers::{AlQuranCloudClient, MuslimSalatClient};
pub use repository::{ContentRepository, FetchError, PrayerTimesRepository, VerseRepository};
pub use types::{Edition, FavoriteMark, PrayerDay, PrayerTimes, TOTAL_AYAHS, Verse};
