//! Error types for cachepull
//!
//! All modules use `CachePullResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cachepull operations
pub type CachePullResult<T> = Result<T, CachePullError>;

/// All errors that can occur in cachepull
#[derive(Error, Debug)]
pub enum CachePullError {
    // Key template errors
    #[error("Unknown key function '{name}' in template '{template}'")]
    UnknownFunction { name: String, template: String },

    #[error("Malformed key template '{template}' at byte {position}: {reason}")]
    MalformedTemplate {
        template: String,
        position: usize,
        reason: String,
    },

    #[error("Key function '{function}' has no value in this environment")]
    ValueUnavailable { function: String },

    // Store errors
    #[error("Store request failed while {context}")]
    StoreRequest {
        context: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Store returned HTTP {status} while {context}")]
    StoreStatus { context: String, status: u16 },

    #[error("Store listing response was malformed: {reason}")]
    ListingMalformed { reason: String },

    #[error("Invalid store endpoint '{endpoint}': {reason}")]
    EndpointInvalid { endpoint: String, reason: String },

    // Archive errors
    #[error("Unsupported archive extension '{extension}'")]
    ArchiveUnsupported { extension: String },

    #[error("Failed to extract {archive} into {dest}: {reason}")]
    Extract {
        archive: PathBuf,
        dest: PathBuf,
        reason: String,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CachePullError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a store request error with context
    pub fn store_request(context: impl Into<String>, source: ureq::Error) -> Self {
        Self::StoreRequest {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ValueUnavailable { function } => match function.as_str() {
                "branch" => Some("Pass --branch or set BITRISE_GIT_BRANCH"),
                "stack-rev" => Some("Pass --stack-rev or set BITRISE_OSX_STACK_REV_ID"),
                _ => None,
            },
            Self::ArchiveUnsupported { .. } => Some("Supported extensions: zip, tar.gz, tgz, tar"),
            Self::EndpointInvalid { .. } => {
                Some("Endpoints must include a scheme, e.g. https://s3.eu-west-1.amazonaws.com")
            }
            Self::StoreStatus { status: 403, .. } => {
                Some("Check AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY and the bucket region")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CachePullError::UnknownFunction {
            name: "rev".to_string(),
            template: "cache-{{ rev }}".to_string(),
        };
        assert!(err.to_string().contains("Unknown key function 'rev'"));
    }

    #[test]
    fn value_unavailable_hint() {
        let err = CachePullError::ValueUnavailable {
            function: "branch".to_string(),
        };
        assert_eq!(err.hint(), Some("Pass --branch or set BITRISE_GIT_BRANCH"));
    }

    #[test]
    fn forbidden_status_hint_mentions_credentials() {
        let err = CachePullError::StoreStatus {
            context: "listing keys".to_string(),
            status: 403,
        };
        assert!(err.hint().unwrap().contains("AWS_ACCESS_KEY_ID"));
    }

    #[test]
    fn io_has_no_hint() {
        let err = CachePullError::io(
            "reading archive",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert!(err.hint().is_none());
    }
}
