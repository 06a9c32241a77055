//! Terminal build outcomes.
//!
//! Every build resolves to exactly one [`Response`]. The status taxonomy is
//! wire-stable: consumers switch on it to decide whether to swap modules in,
//! drop the request, or re-register.

use crate::package::{LoadError, ModuleBundle};
use crate::request::ReloadRequest;

/// Terminal status of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The package loaded; `modules` carries the bundle.
    ReloadReady,
    /// The file mapped but failed the magic check or parser validation.
    DataBroken,
    /// The requested fingerprint has no eligible registry entry.
    DataMissing,
    /// The source file is absent or could not be mapped.
    MmapFailure,
    /// Copying the package to its install location failed.
    InstallFailure,
}

impl ResponseStatus {
    /// Returns true for the success status.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::ReloadReady)
    }

    /// Returns the status name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReloadReady => "reload_ready",
            Self::DataBroken => "data_broken",
            Self::DataMissing => "data_missing",
            Self::MmapFailure => "mmap_failure",
            Self::InstallFailure => "install_failure",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&LoadError> for ResponseStatus {
    fn from(error: &LoadError) -> Self {
        match error {
            LoadError::Install { .. } => Self::InstallFailure,
            LoadError::Mmap { .. } => Self::MmapFailure,
            LoadError::Broken { .. } => Self::DataBroken,
        }
    }
}

/// Terminal outcome of one build, keyed by request fingerprint.
///
/// `modules` is present exactly when `status` is
/// [`ResponseStatus::ReloadReady`]; `request` is a copy of the originating
/// request for auditing, absent only when the fingerprint resolved to
/// nothing.
#[derive(Debug)]
pub struct Response {
    /// Fingerprint of the request that produced this outcome.
    pub id: u64,
    /// Terminal status.
    pub status: ResponseStatus,
    /// Copy of the originating request, when one existed.
    pub request: Option<ReloadRequest>,
    /// Loaded modules on success.
    pub modules: Option<ModuleBundle>,
}

impl Response {
    /// Successful outcome carrying the loaded bundle.
    pub fn ready(id: u64, request: ReloadRequest, modules: ModuleBundle) -> Self {
        Self {
            id,
            status: ResponseStatus::ReloadReady,
            request: Some(request),
            modules: Some(modules),
        }
    }

    /// Failed outcome for a resolved request.
    pub fn failure(id: u64, request: ReloadRequest, status: ResponseStatus) -> Self {
        Self {
            id,
            status,
            request: Some(request),
            modules: None,
        }
    }

    /// Outcome for a fingerprint with no eligible registry entry.
    ///
    /// Carries the queried id so callers can correlate the miss.
    pub fn missing(id: u64) -> Self {
        Self {
            id,
            status: ResponseStatus::DataMissing,
            request: None,
            modules: None,
        }
    }

    /// Returns true when the build succeeded and `modules` is present.
    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::EngineType;

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", ResponseStatus::ReloadReady), "reload_ready");
        assert_eq!(format!("{}", ResponseStatus::MmapFailure), "mmap_failure");
    }

    #[test]
    fn test_status_from_load_error() {
        let err = LoadError::Install {
            location: "dst.data".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(ResponseStatus::from(&err), ResponseStatus::InstallFailure);

        let err = LoadError::Mmap {
            path: "src.data".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "absent"),
        };
        assert_eq!(ResponseStatus::from(&err), ResponseStatus::MmapFailure);
    }

    #[test]
    fn test_missing_response_has_no_request_or_modules() {
        let response = Response::missing(42);
        assert_eq!(response.id, 42);
        assert_eq!(response.status, ResponseStatus::DataMissing);
        assert!(response.request.is_none());
        assert!(response.modules.is_none());
        assert!(!response.is_ready());
    }

    #[test]
    fn test_failure_response_keeps_request_copy() {
        let request = ReloadRequest::new(EngineType::Desktop, "engine.data", b"YMKT");
        let response = Response::failure(7, request.clone(), ResponseStatus::DataBroken);
        assert_eq!(response.request.as_ref(), Some(&request));
        assert!(response.modules.is_none());
    }
}
