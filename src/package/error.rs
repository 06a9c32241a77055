//! Error types for data-package parsing and loading.
//!
//! Parse failures ([`PackageError`]) describe what is wrong with a package
//! image. Load failures ([`LoadError`]) wrap them with the file-level
//! context the loader needs to map an outcome onto the wire-stable response
//! status taxonomy.

use std::io;

use thiserror::Error;

/// A structurally invalid package image.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Leading bytes do not match the expected magic number
    #[error("magic number mismatch (expected {expected:02x?})")]
    MagicMismatch {
        /// Magic number the request expected
        expected: Vec<u8>,
    },

    /// Image ends before a length or payload field is complete
    #[error("package image truncated at offset {offset}")]
    Truncated {
        /// Byte offset where the image ran out
        offset: usize,
    },

    /// A section name is not valid UTF-8
    #[error("section name at offset {offset} is not valid UTF-8")]
    InvalidSectionName {
        /// Byte offset of the offending name field
        offset: usize,
    },

    /// The same section name appears twice
    #[error("duplicate section {0:?}")]
    DuplicateSection(String),

    /// A section the engine requires is absent
    #[error("missing required section {0:?}")]
    MissingSection(&'static str),

    /// The version section does not hold a UTF-8 string
    #[error("version section is not valid UTF-8")]
    InvalidVersion,
}

/// A failed attempt to load a package from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Copying the package to its install location failed
    #[error("failed to install package to {location}: {source}")]
    Install {
        /// Install location the copy targeted
        location: String,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Opening or memory-mapping the effective source failed
    #[error("failed to map package {path}: {source}")]
    Mmap {
        /// Path that could not be mapped
        path: String,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The file mapped fine but its content is invalid
    #[error("broken package {path}: {source}")]
    Broken {
        /// Path of the broken package
        path: String,
        /// Parse failure detail
        source: PackageError,
    },
}
