//! Data-package format and the runtime views over it.
//!
//! A data package is a single versioned binary file: a magic-number prefix
//! followed by a section table carrying the dictionary, connection costs,
//! segmenter tables, and a mandatory version string. This module provides
//! both halves of the format: [`PackageWriter`] assembles images and
//! [`PackageReader`] parses them zero-copy. On top of those sit the
//! mmap-backed [`DataManager`] and the [`ModuleBundle`] the engine
//! ultimately consumes.

pub mod error;
pub mod manager;
pub mod modules;
pub mod reader;
pub mod writer;

pub use error::{LoadError, PackageError};
pub use manager::{DataManager, VERSION_SECTION};
pub use modules::{
    Connector, Dictionary, ModuleBundle, PredictorKind, Segmenter, CONNECTION_SECTION,
    DICTIONARY_SECTION, SEGMENTER_SECTION,
};
pub use reader::PackageReader;
pub use writer::PackageWriter;
