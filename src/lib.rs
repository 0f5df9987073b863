//! Companion library exports: content clients, view-state core, preferences.

pub mod content;
pub mod core;

#[cfg(test)]
pub mod test_support;
