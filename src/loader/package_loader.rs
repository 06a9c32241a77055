//! Synchronous package loading.
//!
//! One call runs the whole load protocol for a resolved request: optional
//! copy to the install location, open and mmap of the effective source,
//! magic validation, and module materialization. Failures never propagate
//! as errors; they are folded into a terminal [`Response`] so the outcome
//! can be cached and re-served verbatim.
//!
//! Check ordering is contractual: a nonexistent file is an mmap failure,
//! never "broken data"; a file that maps but carries the wrong magic is
//! broken data, never an mmap failure.

use std::fs;
use std::sync::Arc;

use tracing::{info, warn};

use super::response::{Response, ResponseStatus};
use crate::package::{DataManager, LoadError, ModuleBundle};
use crate::request::ReloadRequest;

/// Loads the package described by `request` and returns the terminal
/// response for fingerprint `id`.
///
/// Blocking: performs file copy, mmap, and parse on the calling thread. The
/// orchestrator runs this under `spawn_blocking`; callers outside the
/// orchestrator may invoke it directly for synchronous loads.
pub fn load_package(id: u64, request: &ReloadRequest) -> Response {
    match try_load(request) {
        Ok(modules) => {
            info!(
                id,
                path = request.effective_path(),
                version = modules.data_manager().data_version(),
                "package loaded"
            );
            Response::ready(id, request.clone(), modules)
        }
        Err(error) => {
            let status = ResponseStatus::from(&error);
            warn!(id, %status, %error, "package load failed");
            Response::failure(id, request.clone(), status)
        }
    }
}

fn try_load(request: &ReloadRequest) -> Result<ModuleBundle, LoadError> {
    if let Some(location) = request
        .install_location
        .as_deref()
        .filter(|location| !location.is_empty())
    {
        fs::copy(&request.file_path, location).map_err(|source| LoadError::Install {
            location: location.to_string(),
            source,
        })?;
    }

    let effective = request.effective_path();
    let manager = DataManager::from_file(effective, &request.magic_number)?;
    ModuleBundle::new(Arc::new(manager), request.engine_type).map_err(|source| {
        LoadError::Broken {
            path: effective.to_string(),
            source,
        }
    })
}
