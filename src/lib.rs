//! cachepull - CI build cache restore
//!
//! Resolves restore-key templates against the current CI context and
//! pulls the first matching archive from an S3-compatible object store.

pub mod cli;
pub mod context;
pub mod error;
pub mod extract;
pub mod keys;
pub mod restore;
pub mod store;
pub mod template;
pub mod ui;
pub mod workspace;

pub use error::{CachePullError, CachePullResult};
