//! Maps repository results and stored preferences to what presentation shows.

use crate::content::{FetchError, Verse};
use crate::core::preferences::PreferenceStore;
use crate::core::state::UiState;

/// Success and Failure come straight from the result. Loading is the caller's
/// job, sent before the fetch starts.
pub fn to_ui_state<T>(result: Result<T, FetchError>) -> UiState<T> {
    UiState::from(result)
}

/// True iff the stored favorite has the same surah and ayah as `verse`.
pub fn is_favorite(verse: &Verse, store: &PreferenceStore) -> bool {
    store.favorite() == Some(verse.key())
}

/// Flips the favorite state of `verse` and returns the new state.
///
/// Marking a verse replaces any previous favorite; only one is kept.
pub fn toggle_favorite(verse: &Verse, store: &PreferenceStore) -> bool {
    if is_favorite(verse, store) {
        store.clear_favorite();
        false
    } else {
        store.set_favorite(verse.key());
        true
    }
}
