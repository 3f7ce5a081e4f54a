//! Remote object store access
//!
//! The restore protocol only needs two capabilities: ask whether an
//! object matching a key exists, and download a matched object. The
//! [`ObjectStore`] trait keeps the orchestrator independent of the
//! concrete backend; [`s3::S3Store`] implements it for S3-compatible
//! stores.

pub mod s3;
mod sigv4;

use crate::error::CachePullResult;
use std::fmt;
use std::path::Path;

/// Identifier of a stored object, as reported by the store.
///
/// The store may apply prefix matching, so the matched object's key can
/// extend the probed key. Downloads always use the object id, never the
/// probe key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Abstract object store interface
pub trait ObjectStore {
    /// Check whether an object matching `key` exists.
    ///
    /// Returns the id of the matched object, or `None` on a miss.
    fn exists(&self, key: &str) -> CachePullResult<Option<ObjectId>>;

    /// Download the object to `dest`, returning the number of bytes written.
    fn download(&self, id: &ObjectId, dest: &Path) -> CachePullResult<u64>;
}
