//! Engine reload requests and their identity.
//!
//! A [`ReloadRequest`] describes one candidate data package the engine could
//! swap in: where the file lives, the magic number it must carry, the engine
//! flavor it targets, and how urgent the request is. Requests arrive from
//! several producers and are deduplicated by content, so identity is defined
//! by a deterministic [`fingerprint`] over the canonical byte encoding rather
//! than by object handles.

mod fingerprint;

pub use fingerprint::{canonical_bytes, fingerprint, NO_REQUEST};

use serde::{Deserialize, Serialize};

/// Engine flavor a data package is loaded for.
///
/// The flavor selects the predictor wired downstream of the loaded modules,
/// and it participates in request identity: the same file requested for
/// desktop and for mobile are two distinct requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineType {
    /// Desktop engine with the default predictor.
    #[default]
    Desktop,
    /// Mobile engine with the mobile predictor.
    Mobile,
}

impl EngineType {
    /// Returns the flavor name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request to load one data package.
///
/// Requests are plain data: cloning is cheap enough for the handful of live
/// requests the registry holds, and equality of the canonical encoding
/// defines identity. Lower `priority` values outrank higher ones; 0 is the
/// highest priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadRequest {
    /// Engine flavor the package is loaded for.
    pub engine_type: EngineType,
    /// Path to the data package on disk.
    pub file_path: String,
    /// When set, the package is copied here before loading and the copy
    /// becomes the effective source.
    pub install_location: Option<String>,
    /// Expected leading bytes of the package file.
    pub magic_number: Vec<u8>,
    /// Request priority; numerically smaller wins, 0 is highest.
    pub priority: i32,
}

impl ReloadRequest {
    /// Creates a request with no install location and priority 0.
    pub fn new(
        engine_type: EngineType,
        file_path: impl Into<String>,
        magic_number: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            engine_type,
            file_path: file_path.into(),
            install_location: None,
            magic_number: magic_number.into(),
            priority: 0,
        }
    }

    /// Sets the install location the package is copied to before loading.
    pub fn with_install_location(mut self, location: impl Into<String>) -> Self {
        self.install_location = Some(location.into());
        self
    }

    /// Sets the request priority (smaller wins).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Path the package is actually loaded from: the install location when
    /// one is set, the source path otherwise.
    pub fn effective_path(&self) -> &str {
        self.install_location.as_deref().unwrap_or(&self.file_path)
    }
}
