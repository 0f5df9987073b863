//! # Core Application Logic
//!
//! Everything between the content repository and whatever draws the
//! screen. It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • UiState (tri-state)  │
//!                    │  • projector (mapping)  │
//!                    │  • Companion (lifecycle)│
//!                    │  • PreferenceStore      │
//!                    └───────────┬─────────────┘
//!                                │ Update channel
//!                    ┌───────────┴─────────────┐
//!                    ▼                         ▼
//!             ┌────────────┐            ┌────────────┐
//!             │    CLI     │            │   other    │
//!             │  (clap)    │            │  adapters  │
//!             └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `UiState<T>`, Loading / Success / Failure
//! - [`projector`]: result → `UiState`, favorite lookup and toggle
//! - [`companion`]: the `Companion`, which runs fetches and emits `Update`s
//! - [`preferences`]: persisted edition and favorite mark
//! - [`config`]: config file, env and CLI resolution

pub mod companion;
pub mod config;
pub mod preferences;
pub mod projector;
pub mod state;

pub use companion::{Companion, Update};
pub use preferences::PreferenceStore;
pub use state::UiState;
