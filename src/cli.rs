//! # CLI Adapter
//!
//! The command-line presentation layer. Parses arguments, wires the core
//! together from the resolved config, and renders `Update`s as text.
//!
//! This is the only module that prints to stdout/stderr; diagnostics go to
//! the log file.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};
use tokio::sync::mpsc::UnboundedReceiver;

use companion::content::{
    AlQuranCloudClient, ContentRepository, Edition, MuslimSalatClient, PrayerTimes, Verse,
};
use companion::core::config::ResolvedConfig;
use companion::core::preferences::{EDITION_KEY, PreferenceStore};
use companion::core::projector::to_ui_state;
use companion::core::{Companion, UiState, Update};

#[derive(Parser)]
#[command(name = "companion", about = "Quran verses and prayer times from the terminal")]
pub struct Args {
    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show a random ayah
    Ayah {
        /// Switch to this edition before fetching (remembered)
        #[arg(short, long)]
        edition: Option<String>,
        /// Toggle the favorite mark on the fetched ayah
        #[arg(short, long)]
        favorite: bool,
    },
    /// Show today's prayer times
    Prayer {
        /// City or address (defaults to the configured location)
        location: Option<String>,
    },
    /// Show a random ayah and today's prayer times together
    Today {
        location: Option<String>,
    },
    /// Show or change the selected edition
    Edition {
        /// Edition identifier to select, e.g. en.sahih
        edition: Option<String>,
        /// List the editions offered in the menu
        #[arg(short, long)]
        list: bool,
    },
    /// Show or clear the favorite ayah
    Favorite {
        #[arg(short, long)]
        clear: bool,
    },
}

impl Command {
    pub fn location(&self) -> Option<&str> {
        match self {
            Command::Prayer { location } | Command::Today { location } => location.as_deref(),
            _ => None,
        }
    }
}

/// Build the content repository from the resolved endpoints.
pub fn build_repository(config: &ResolvedConfig) -> ContentRepository {
    ContentRepository::new(
        Arc::new(AlQuranCloudClient::with_timeout(
            Some(config.alquran_base_url.clone()),
            config.request_timeout,
        )),
        Arc::new(MuslimSalatClient::with_timeout(
            config.muslimsalat_api_key.clone(),
            Some(config.muslimsalat_base_url.clone()),
            config.request_timeout,
        )),
    )
}

/// Open the preference store, seeding the edition from config on a fresh install.
pub fn open_store(config: &ResolvedConfig) -> PreferenceStore {
    let store = match config.preferences_path {
        Some(ref path) => PreferenceStore::open(path),
        None => PreferenceStore::in_memory(),
    };
    if store.get(EDITION_KEY).is_none()
        && let Some(ref edition) = config.default_edition
    {
        info!("Seeding edition from config: {}", edition);
        store.set_edition(&Edition::new(edition.as_str()));
    }
    store
}

pub async fn run(command: Command, config: ResolvedConfig) -> ExitCode {
    let store = Arc::new(open_store(&config));
    let repository = build_repository(&config);

    match command {
        Command::Ayah { edition, favorite } => {
            let (mut app, mut updates) = Companion::new(repository, store);
            if let Some(edition) = edition {
                app.set_ayah_edition(Edition::new(edition));
            }
            app.fetch_random_verse();
            if !await_verse(&mut updates).await {
                return ExitCode::FAILURE;
            }
            if favorite && let Some(now) = app.toggle_favorite() {
                println!("{}", favorite_label(now));
            }
            ExitCode::SUCCESS
        }
        Command::Prayer { .. } => {
            let (mut app, mut updates) = Companion::new(repository, store);
            app.fetch_prayer_times(config.location.as_str());
            if await_prayer_times(&mut updates).await {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Today { .. } => {
            let edition = store.edition();
            let (verse, times) = futures::join!(
                repository.fetch_random_verse(&edition),
                repository.fetch_prayer_times(&config.location)
            );
            let verse_ok = render_verse_state(&to_ui_state(verse));
            println!();
            let times_ok = render_prayer_state(&to_ui_state(times));
            if verse_ok && times_ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Edition { edition, list } => {
            if list {
                let current = store.edition();
                for known in Edition::KNOWN {
                    let marker = if *known == current.as_str() { "*" } else { " " };
                    println!("{marker} {known}");
                }
                return ExitCode::SUCCESS;
            }
            match edition {
                Some(edition) => {
                    let edition = Edition::new(edition);
                    if !edition.is_known() {
                        eprintln!("Note: '{edition}' is not in the menu; the server will decide if it exists.");
                    }
                    store.set_edition(&edition);
                    println!("Edition set to {edition}");
                }
                None => println!("{}", store.edition()),
            }
            ExitCode::SUCCESS
        }
        Command::Favorite { clear } => {
            if clear {
                store.clear_favorite();
                println!("Favorite cleared");
            } else {
                match store.favorite() {
                    Some(mark) => println!("Favorite ayah: {mark}"),
                    None => println!("No favorite ayah"),
                }
            }
            ExitCode::SUCCESS
        }
    }
}

/// Drains updates until the verse (and its favorite flag) has been shown.
async fn await_verse(updates: &mut UnboundedReceiver<Update>) -> bool {
    while let Some(update) = updates.recv().await {
        match update {
            Update::Verse(state) => {
                let terminal = state.is_terminal();
                let ok = render_verse_state(&state);
                if terminal && !ok {
                    return false;
                }
            }
            Update::Favorite(favorite) => {
                println!("{}", favorite_label(favorite));
                return true;
            }
            Update::PrayerTimes(_) => {}
        }
    }
    false
}

async fn await_prayer_times(updates: &mut UnboundedReceiver<Update>) -> bool {
    while let Some(update) = updates.recv().await {
        if let Update::PrayerTimes(state) = update {
            let ok = render_prayer_state(&state);
            if state.is_terminal() {
                return ok;
            }
        }
    }
    false
}

fn favorite_label(favorite: bool) -> &'static str {
    if favorite { "♥ favorite" } else { "♡ not favorite" }
}

/// Returns false for a failure.
fn render_verse_state(state: &UiState<Verse>) -> bool {
    match state {
        UiState::Loading => {
            eprintln!("{}", state.message().unwrap_or_default());
            true
        }
        UiState::Success(verse) => {
            println!("{}", verse.text);
            println!(
                "-- {} ({}) {}",
                verse.surah_name,
                verse.surah_name_translation,
                verse.reference()
            );
            println!("   {}", verse.edition_name);
            true
        }
        UiState::Failure(e) => {
            error!("Verse fetch failed: {}", e);
            eprintln!("Network error");
            eprintln!("{}", state.message().unwrap_or_default());
            false
        }
    }
}

fn render_prayer_state(state: &UiState<PrayerTimes>) -> bool {
    match state {
        UiState::Loading => {
            eprintln!("{}", state.message().unwrap_or_default());
            true
        }
        UiState::Success(times) => {
            println!("Prayer times for {}, {}", times.city, times.country);
            if let Some(day) = times.today() {
                match day.date() {
                    Some(date) => println!("{}", date.format("%A, %-d %B %Y")),
                    None => println!("{}", day.date_for),
                }
                for (name, time) in day.entries() {
                    println!("  {name:<8} {time}");
                }
            }
            if !times.qibla_direction.is_empty() {
                println!("Qibla: {}°", times.qibla_direction);
            }
            true
        }
        UiState::Failure(e) => {
            error!("Prayer times fetch failed: {}", e);
            eprintln!("Network error");
            eprintln!("{}", state.message().unwrap_or_default());
            false
        }
    }
}
