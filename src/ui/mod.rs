//! Terminal output with automatic fallback to plain text in CI

pub mod context;
pub mod output;
pub mod progress;
