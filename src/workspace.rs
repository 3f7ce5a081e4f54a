//! Scoped temporary workspace for downloaded archives
//!
//! One workspace exists per restore run. It holds at most one file (the
//! downloaded archive) and is removed on every exit path.

use crate::error::{CachePullError, CachePullResult};
use std::path::Path;
use tracing::warn;

/// Run `f` with a fresh temporary directory, removing it afterwards.
///
/// The directory is deleted when the closure returns; if the closure
/// panics, the `TempDir` drop guard still removes it. A failed cleanup
/// is logged rather than masking the closure's result.
pub fn with_scoped_temp_dir<T>(f: impl FnOnce(&Path) -> T) -> CachePullResult<T> {
    let dir = tempfile::Builder::new()
        .prefix("cachepull-")
        .tempdir()
        .map_err(|e| CachePullError::io("creating temporary workspace", e))?;

    let value = f(dir.path());

    if let Err(e) = dir.close() {
        warn!("Failed to remove temporary workspace: {}", e);
    }

    Ok(value)
}
