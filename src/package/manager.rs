//! Memory-mapped access to a loaded data package.
//!
//! The [`DataManager`] owns the mapping for one package file and exposes the
//! parsed section table over it. The mapping is immutable after
//! construction, so a manager can be shared freely across threads behind an
//! `Arc`.

use std::fs::File;
use std::ops::Range;

use memmap2::Mmap;
use tracing::debug;

use super::error::{LoadError, PackageError};
use super::reader::PackageReader;

/// Name of the section holding the package's data version string.
pub const VERSION_SECTION: &str = "version";

/// Runtime view over one validated, memory-mapped package file.
#[derive(Debug)]
pub struct DataManager {
    mmap: Mmap,
    filename: Option<String>,
    data_version: String,
    sections: Vec<(String, Range<usize>)>,
}

impl DataManager {
    /// Opens, maps, and validates the package at `path`.
    ///
    /// Open and map failures (missing file, unreadable file, zero-length
    /// file) are reported as [`LoadError::Mmap`]; anything wrong with the
    /// mapped content, including a magic mismatch, is [`LoadError::Broken`].
    pub fn from_file(path: &str, magic: &[u8]) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Mmap {
            path: path.to_string(),
            source,
        })?;
        // SAFETY: published package files are immutable; nothing rewrites a
        // package in place while an engine holds it mapped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| LoadError::Mmap {
            path: path.to_string(),
            source,
        })?;

        let broken = |source: PackageError| LoadError::Broken {
            path: path.to_string(),
            source,
        };

        let reader = PackageReader::parse(&mmap, magic).map_err(broken)?;

        let version_bytes = reader
            .section(VERSION_SECTION)
            .ok_or_else(|| broken(PackageError::MissingSection(VERSION_SECTION)))?;
        let data_version = std::str::from_utf8(version_bytes)
            .map_err(|_| broken(PackageError::InvalidVersion))?
            .to_string();

        // Section payloads borrow from the mapping; keep them as offset
        // ranges so the manager can own both.
        let base = mmap.as_ptr() as usize;
        let sections: Vec<(String, Range<usize>)> = reader
            .sections()
            .map(|(name, data)| {
                let start = data.as_ptr() as usize - base;
                (name.to_string(), start..start + data.len())
            })
            .collect();

        debug!(
            path,
            version = %data_version,
            sections = sections.len(),
            "mapped data package"
        );

        Ok(Self {
            mmap,
            filename: Some(path.to_string()),
            data_version,
            sections,
        })
    }

    /// Data version string embedded in the package.
    pub fn data_version(&self) -> &str {
        &self.data_version
    }

    /// Path the package was loaded from.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Payload of the named section, if the package carries it.
    pub fn section(&self, name: &str) -> Option<&[u8]> {
        self.sections
            .iter()
            .find(|(section_name, _)| section_name == name)
            .map(|(_, range)| &self.mmap[range.clone()])
    }

    /// Offset range of the named section within the image.
    pub(crate) fn section_span(&self, name: &str) -> Option<Range<usize>> {
        self.sections
            .iter()
            .find(|(section_name, _)| section_name == name)
            .map(|(_, range)| range.clone())
    }

    /// The full mapped image.
    pub fn image(&self) -> &[u8] {
        &self.mmap
    }
}
