//! # Preference Store
//!
//! Small string-keyed persistence for user preferences: the selected text
//! edition and the favorite mark of the last-viewed verse.
//!
//! Backed by a flat JSON object at `~/.companion/preferences.json`. Every
//! write rewrites the whole file atomically (write `.tmp`, then `rename()`).
//!
//! None of the public operations fail. A missing or unreadable file reads as
//! "never set"; a failed write is logged and the value still applies for the
//! rest of the run. Share one instance as `Arc<PreferenceStore>`; concurrent
//! writers are serialized by an internal mutex, last write wins.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::content::{Edition, FavoriteMark};

pub const EDITION_KEY: &str = "ayah_edition";
pub const FAVORITE_KEY: &str = "favorite_ayah";

/// Returns `~/.companion/preferences.json`.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".companion").join("preferences.json"))
}

pub struct PreferenceStore {
    /// None = memory only (tests, or no home directory).
    path: Option<PathBuf>,
    values: Mutex<BTreeMap<String, String>>,
}

impl PreferenceStore {
    /// Opens the store at `path`, loading whatever is already there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_values(&path);
        debug!("Opened preferences at {} ({} keys)", path.display(), values.len());
        Self {
            path: Some(path),
            values: Mutex::new(values),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A panicking writer can't leave the map half-updated, so poison is ignored.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ------------------------------------------------------------------------
    // Raw key-value access
    // ------------------------------------------------------------------------

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        let mut values = self.lock();
        values.insert(key.to_string(), value.into());
        self.persist(&values);
    }

    pub fn remove(&self, key: &str) {
        let mut values = self.lock();
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }

    /// Writes the snapshot while the caller still holds the lock, so the file
    /// always reflects the most recent write.
    fn persist(&self, values: &BTreeMap<String, String>) {
        let Some(ref path) = self.path else {
            return;
        };
        if let Err(e) = atomic_write_json(path, values) {
            warn!("Failed to save preferences to {}: {}", path.display(), e);
        }
    }

    // ------------------------------------------------------------------------
    // Typed preferences
    // ------------------------------------------------------------------------

    /// The selected edition, or `Edition::default()` if none was ever set.
    pub fn edition(&self) -> Edition {
        self.get(EDITION_KEY)
            .filter(|id| !id.trim().is_empty())
            .map(Edition::new)
            .unwrap_or_default()
    }

    pub fn set_edition(&self, edition: &Edition) {
        info!("Edition set to {}", edition);
        self.set(EDITION_KEY, edition.as_str());
    }

    pub fn favorite(&self) -> Option<FavoriteMark> {
        let raw = self.get(FAVORITE_KEY)?;
        let mark = parse_mark(&raw);
        if mark.is_none() {
            warn!("Ignoring malformed favorite mark: {:?}", raw);
        }
        mark
    }

    pub fn set_favorite(&self, mark: FavoriteMark) {
        self.set(FAVORITE_KEY, mark.to_string());
    }

    pub fn clear_favorite(&self) {
        self.remove(FAVORITE_KEY);
    }
}

/// Parses the `surah:ayah` form written by `FavoriteMark`'s `Display`.
fn parse_mark(raw: &str) -> Option<FavoriteMark> {
    let (surah, ayah) = raw.split_once(':')?;
    Some(FavoriteMark::new(
        surah.trim().parse().ok()?,
        ayah.trim().parse().ok()?,
    ))
}

fn load_values(path: &Path) -> BTreeMap<String, String> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!("Failed to read preferences {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        warn!("Preferences file {} is corrupt, starting fresh: {}", path.display(), e);
        BTreeMap::new()
    })
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json(path: &Path, data: &BTreeMap<String, String>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let result = fs::write(&tmp_path, json).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
