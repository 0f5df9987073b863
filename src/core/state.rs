//! # View State
//!
//! The tri-state every fetch is presented through:
//!
//! ```text
//! Idle ──trigger──▶ Loading ──▶ Success(T)
//!                      ▲   └──▶ Failure(FetchError)
//!                      └──────── trigger again (from any state)
//! ```
//!
//! Presentation never sees the error detail: every `Failure` renders the
//! same generic message. The error is kept for logging.

use crate::content::FetchError;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const FAILURE_MESSAGE: &str = "Please check your connection & try again...";

#[derive(Debug, Clone, PartialEq)]
pub enum UiState<T> {
    Loading,
    Success(T),
    Failure(FetchError),
}

impl<T> UiState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            UiState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Status text to show instead of data; `None` on success.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            UiState::Loading => Some(LOADING_MESSAGE),
            UiState::Success(_) => None,
            UiState::Failure(_) => Some(FAILURE_MESSAGE),
        }
    }
}

impl<T> From<Result<T, FetchError>> for UiState<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => UiState::Success(data),
            Err(e) => UiState::Failure(e),
        }
    }
}
