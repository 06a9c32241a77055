//! The data loader: registry plus orchestrator behind one facade.
//!
//! Producers register competing reload requests, the registry nominates the
//! winner, and [`DataLoader::build`] materializes that winner's modules
//! exactly once, handing the outcome back through a [`ResponseFuture`].
//!
//! # Flow
//!
//! ```text
//! producer ──► register_request ──► registry ranks, returns top id
//! producer ──► build(top id)    ──► orchestrator: cache / in-flight / new worker
//! consumer ──► future.wait()    ──► terminal Response, modules on success
//! failure  ──► report_load_failure ──► entry soft-deleted, next winner nominated
//! ```

pub mod future;
pub mod orchestrator;
pub mod package_loader;
pub mod response;

pub use future::ResponseFuture;
pub use orchestrator::{BuildOrchestrator, OrchestratorStats};
pub use package_loader::load_package;
pub use response::{Response, ResponseStatus};

use std::sync::Arc;

use crate::registry::RequestRegistry;
use crate::request::ReloadRequest;

/// Facade aggregating the request registry and the build orchestrator.
///
/// Carries no state of its own beyond the composition. All methods are
/// callable from any thread; [`build`](Self::build) additionally requires a
/// tokio runtime to be current.
pub struct DataLoader {
    registry: Arc<RequestRegistry>,
    orchestrator: BuildOrchestrator,
}

impl DataLoader {
    /// Creates a loader with an empty registry and cache.
    pub fn new() -> Self {
        let registry = Arc::new(RequestRegistry::new());
        let orchestrator = BuildOrchestrator::new(Arc::clone(&registry));
        Self {
            registry,
            orchestrator,
        }
    }

    /// Registers a request and returns the current top fingerprint.
    pub fn register_request(&self, request: &ReloadRequest) -> u64 {
        self.registry.register_request(request)
    }

    /// Reports that the request with fingerprint `id` failed downstream and
    /// returns the new top fingerprint.
    pub fn report_load_failure(&self, id: u64) -> u64 {
        self.registry.report_load_failure(id)
    }

    /// Builds the modules for fingerprint `id`.
    pub fn build(&self, id: u64) -> ResponseFuture {
        self.orchestrator.build(id)
    }

    /// Clears the registry, the pending builds, and the response cache.
    pub fn clear(&self) {
        self.registry.clear();
        self.orchestrator.clear();
    }

    /// Snapshot of the orchestrator's build statistics.
    pub fn stats(&self) -> OrchestratorStats {
        self.orchestrator.stats()
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}
