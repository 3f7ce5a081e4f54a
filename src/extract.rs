//! Archive extraction
//!
//! The archive format is chosen by the configured extension input, not
//! sniffed from the payload. Extraction reports failure as-is; no
//! integrity checking happens beyond what unpacking itself surfaces.

use crate::error::{CachePullError, CachePullResult};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;

/// Supported archive formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    Tar,
}

impl ArchiveFormat {
    /// Resolve a format from an extension input such as `zip` or `.tar.gz`.
    pub fn from_extension(extension: &str) -> CachePullResult<Self> {
        match extension.trim().trim_start_matches('.') {
            "zip" => Ok(Self::Zip),
            "tar.gz" | "tgz" => Ok(Self::TarGz),
            "tar" => Ok(Self::Tar),
            _ => Err(CachePullError::ArchiveUnsupported {
                extension: extension.to_string(),
            }),
        }
    }

    /// Canonical extension used when naming downloaded archives.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
            Self::Tar => "tar",
        }
    }
}

/// Unpack `archive` into `dest`, creating `dest` if needed.
pub fn unarchive(format: ArchiveFormat, archive: &Path, dest: &Path) -> CachePullResult<()> {
    std::fs::create_dir_all(dest)
        .map_err(|e| CachePullError::io(format!("creating {}", dest.display()), e))?;

    let file = File::open(archive)
        .map_err(|e| CachePullError::io(format!("opening {}", archive.display()), e))?;

    match format {
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| extract_error(archive, dest, e))?;
            zip.extract(dest).map_err(|e| extract_error(archive, dest, e))
        }
        ArchiveFormat::TarGz => tar::Archive::new(GzDecoder::new(file))
            .unpack(dest)
            .map_err(|e| extract_error(archive, dest, e)),
        ArchiveFormat::Tar => tar::Archive::new(file)
            .unpack(dest)
            .map_err(|e| extract_error(archive, dest, e)),
    }
}

fn extract_error(
    archive: &Path,
    dest: &Path,
    source: impl std::fmt::Display,
) -> CachePullError {
    CachePullError::Extract {
        archive: archive.to_path_buf(),
        dest: dest.to_path_buf(),
        reason: source.to_string(),
    }
}
