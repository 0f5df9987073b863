//! # Companion
//!
//! Owns the fetch/toggle lifecycle for one presentation surface. Triggers
//! return immediately; results arrive on the update channel handed out by
//! [`Companion::new`].
//!
//! ```text
//! fetch_random_verse()
//!   ├─ sends Update::Verse(Loading)           (synchronously, before spawning)
//!   └─ tokio task ─▶ repository ─▶ Update::Verse(Success | Failure)
//!                                  └▶ Update::Favorite(bool)   (on success)
//! ```
//!
//! ## In-flight policy
//!
//! Cancel-and-replace, per content type. A new trigger aborts the previous
//! task and bumps a generation counter; a task only delivers if its
//! generation is still current. The check and the delivery happen under the
//! same lock the trigger uses to send `Loading`, so a superseded result can
//! never land after its replacement's `Loading`.
//!
//! Verses and prayer times have separate slots and never cancel each other.
//!
//! Dropping the `Companion` aborts pending tasks and retires their
//! generations, so nothing is written or sent afterwards.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::AbortHandle;

use crate::content::{ContentRepository, Edition, PrayerTimes, Verse};
use crate::core::preferences::PreferenceStore;
use crate::core::projector::{is_favorite, to_ui_state, toggle_favorite};
use crate::core::state::UiState;

/// Everything presentation needs to re-render.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Verse(UiState<Verse>),
    PrayerTimes(UiState<PrayerTimes>),
    Favorite(bool),
}

#[derive(Default)]
struct VerseSlot {
    generation: u64,
    /// The verse currently on screen; None while loading or after a failure.
    current: Option<Verse>,
}

#[derive(Default)]
struct PrayerSlot {
    generation: u64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn deliver(updates: &UnboundedSender<Update>, update: Update) {
    if updates.send(update).is_err() {
        debug!("Update receiver dropped, discarding update");
    }
}

pub struct Companion {
    repository: ContentRepository,
    store: Arc<PreferenceStore>,
    updates: UnboundedSender<Update>,
    verse: Arc<Mutex<VerseSlot>>,
    prayer: Arc<Mutex<PrayerSlot>>,
    verse_task: Option<AbortHandle>,
    prayer_task: Option<AbortHandle>,
}

impl Companion {
    pub fn new(
        repository: ContentRepository,
        store: Arc<PreferenceStore>,
    ) -> (Self, UnboundedReceiver<Update>) {
        let (updates, receiver) = unbounded_channel();
        let (verses, prayers) = repository.source_names();
        info!("Companion ready (verses: {}, prayer times: {})", verses, prayers);
        let companion = Self {
            repository,
            store,
            updates,
            verse: Arc::default(),
            prayer: Arc::default(),
            verse_task: None,
            prayer_task: None,
        };
        (companion, receiver)
    }

    pub fn current_verse(&self) -> Option<Verse> {
        lock(&self.verse).current.clone()
    }

    /// Fetches a random verse in the stored edition.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch_random_verse(&mut self) {
        let edition = self.store.edition();
        let generation = {
            let mut slot = lock(&self.verse);
            slot.generation += 1;
            slot.current = None;
            deliver(&self.updates, Update::Verse(UiState::Loading));
            slot.generation
        };
        if let Some(previous) = self.verse_task.take() {
            previous.abort();
        }
        debug!("Verse fetch #{} started (edition={})", generation, edition);

        let repository = self.repository.clone();
        let store = Arc::clone(&self.store);
        let slot = Arc::clone(&self.verse);
        let updates = self.updates.clone();

        let handle = tokio::spawn(async move {
            let result = repository.fetch_random_verse(&edition).await;
            if let Err(ref e) = result {
                warn!("Verse fetch #{} failed: {}", generation, e);
            }

            let mut slot = lock(&slot);
            if slot.generation != generation {
                debug!("Verse fetch #{} superseded, discarding result", generation);
                return;
            }
            let state = to_ui_state(result);
            let favorite = state.data().map(|verse| is_favorite(verse, &store));
            slot.current = state.data().cloned();
            deliver(&updates, Update::Verse(state));
            if let Some(favorite) = favorite {
                deliver(&updates, Update::Favorite(favorite));
            }
        });
        self.verse_task = Some(handle.abort_handle());
    }

    /// Fetches prayer times for `location`. Independent of verse fetches.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch_prayer_times(&mut self, location: impl Into<String>) {
        let location = location.into();
        let generation = {
            let mut slot = lock(&self.prayer);
            slot.generation += 1;
            deliver(&self.updates, Update::PrayerTimes(UiState::Loading));
            slot.generation
        };
        if let Some(previous) = self.prayer_task.take() {
            previous.abort();
        }
        debug!("Prayer times fetch #{} started (location={})", generation, location);

        let repository = self.repository.clone();
        let slot = Arc::clone(&self.prayer);
        let updates = self.updates.clone();

        let handle = tokio::spawn(async move {
            let result = repository.fetch_prayer_times(&location).await;
            if let Err(ref e) = result {
                warn!("Prayer times fetch #{} failed: {}", generation, e);
            }

            let slot = lock(&slot);
            if slot.generation != generation {
                debug!("Prayer times fetch #{} superseded, discarding result", generation);
                return;
            }
            deliver(&updates, Update::PrayerTimes(to_ui_state(result)));
        });
        self.prayer_task = Some(handle.abort_handle());
    }

    /// Persists the edition used by subsequent verse fetches.
    pub fn set_ayah_edition(&self, edition: Edition) {
        self.store.set_edition(&edition);
    }

    /// Toggles the favorite mark of the verse on screen.
    ///
    /// Returns the new state, or `None` if no verse is displayed.
    pub fn toggle_favorite(&self) -> Option<bool> {
        // Store writes hit the disk; the slot lock is released before that.
        let verse = lock(&self.verse).current.clone()?;
        let favorite = toggle_favorite(&verse, &self.store);
        info!(
            "{} {} favorite",
            verse.key(),
            if favorite { "marked" } else { "unmarked" }
        );
        deliver(&self.updates, Update::Favorite(favorite));
        Some(favorite)
    }
}

impl Drop for Companion {
    fn drop(&mut self) {
        lock(&self.verse).generation += 1;
        lock(&self.prayer).generation += 1;
        for task in [self.verse_task.take(), self.prayer_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}
