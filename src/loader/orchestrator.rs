//! Single-flight build orchestration.
//!
//! The orchestrator turns a fingerprint into a terminal [`Response`] while
//! guaranteeing that the expensive load (copy, mmap, parse) runs at most
//! once per fingerprint between clears. Concurrent builds of the same
//! fingerprint share one worker through a broadcast channel; terminal
//! outcomes, failures included, are cached and re-served without touching
//! the filesystem again.
//!
//! ```text
//! Build(id) ──► registry lookup ── miss ──► ready future (data_missing)
//!                  │
//!                  ▼
//!             cache lookup ───── hit ────► ready future (cached response)
//!                  │
//!                  ▼
//!             pending lookup ─── hit ────► future subscribed to worker
//!                  │
//!                  ▼
//!             spawn worker ──────────────► future subscribed to worker
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use super::future::ResponseFuture;
use super::package_loader;
use super::response::{Response, ResponseStatus};
use crate::registry::RequestRegistry;

struct OrchestratorInner {
    /// Bumped by every clear; a worker only stores its result when the
    /// epoch it was spawned under is still current.
    epoch: u64,
    /// At most one in-flight worker per fingerprint.
    pending: HashMap<u64, broadcast::Sender<Arc<Response>>>,
    /// Terminal outcomes since the last clear, failures included.
    cache: HashMap<u64, Arc<Response>>,
}

#[derive(Default)]
struct BuildCounters {
    builds_started: AtomicU64,
    cache_hits: AtomicU64,
    coalesced_waits: AtomicU64,
    missing_requests: AtomicU64,
}

/// Snapshot of orchestrator statistics.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorStats {
    /// Workers spawned since construction.
    pub builds_started: u64,
    /// Builds served from the terminal-response cache.
    pub cache_hits: u64,
    /// Builds that subscribed to an already-running worker.
    pub coalesced_waits: u64,
    /// Builds requested for fingerprints with no eligible entry.
    pub missing_requests: u64,
}

/// Deduplicating async executor for package builds.
///
/// Requires a tokio runtime: [`build`](Self::build) spawns its worker onto
/// the ambient runtime and runs the blocking load under `spawn_blocking`.
pub struct BuildOrchestrator {
    registry: Arc<RequestRegistry>,
    inner: Arc<Mutex<OrchestratorInner>>,
    stats: Arc<BuildCounters>,
}

impl BuildOrchestrator {
    /// Creates an orchestrator resolving fingerprints through `registry`.
    pub fn new(registry: Arc<RequestRegistry>) -> Self {
        Self {
            registry,
            inner: Arc::new(Mutex::new(OrchestratorInner {
                epoch: 0,
                pending: HashMap::new(),
                cache: HashMap::new(),
            })),
            stats: Arc::new(BuildCounters::default()),
        }
    }

    /// Returns a future resolving to the terminal response for `id`.
    ///
    /// A fingerprint with no eligible registry entry resolves immediately
    /// to a `data_missing` response without touching the cache. Otherwise
    /// the future is backed by the cached outcome, an already-running
    /// worker, or a freshly spawned one, in that order of preference.
    pub fn build(&self, id: u64) -> ResponseFuture {
        let Some(request) = self.registry.request_for(id) else {
            self.stats.missing_requests.fetch_add(1, Ordering::Relaxed);
            debug!(id, "build requested for unknown fingerprint");
            return ResponseFuture::ready(Arc::new(Response::missing(id)));
        };

        let mut inner = self.inner.lock();

        if let Some(response) = inner.cache.get(&id) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(id, status = %response.status, "serving cached terminal response");
            return ResponseFuture::ready(Arc::clone(response));
        }

        if let Some(sender) = inner.pending.get(&id) {
            self.stats.coalesced_waits.fetch_add(1, Ordering::Relaxed);
            debug!(id, "subscribing to in-flight build");
            return ResponseFuture::pending(sender.subscribe());
        }

        let (sender, receiver) = broadcast::channel(1);
        inner.pending.insert(id, sender.clone());
        let epoch = inner.epoch;
        drop(inner);

        self.stats.builds_started.fetch_add(1, Ordering::Relaxed);
        info!(id, path = %request.file_path, "starting package build");

        let inner_handle = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let loaded = {
                let request = request.clone();
                tokio::task::spawn_blocking(move || package_loader::load_package(id, &request))
                    .await
            };
            let response = Arc::new(match loaded {
                Ok(response) => response,
                Err(join_error) => {
                    // A panicking parse must still produce a terminal
                    // response, or subscribers would hang forever.
                    error!(id, error = %join_error, "package build task panicked");
                    Response::failure(id, request, ResponseStatus::DataBroken)
                }
            });

            info!(id, status = %response.status, "package build finished");

            let mut inner = inner_handle.lock();
            if inner.epoch == epoch {
                inner.pending.remove(&id);
                inner.cache.insert(id, Arc::clone(&response));
            }
            drop(inner);

            // Cache insert happens before the broadcast, so a racing build()
            // either sees the cache entry or holds a live subscription.
            let _ = sender.send(response);
        });

        ResponseFuture::pending(receiver)
    }

    /// Drops the terminal-response cache and detaches in-flight workers.
    ///
    /// Workers keep running and still broadcast to their subscribers, but
    /// their results no longer populate the fresh cache.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.pending.clear();
        inner.cache.clear();
        debug!(epoch = inner.epoch, "cleared build orchestrator");
    }

    /// Snapshot of the lifetime statistics.
    pub fn stats(&self) -> OrchestratorStats {
        OrchestratorStats {
            builds_started: self.stats.builds_started.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            coalesced_waits: self.stats.coalesced_waits.load(Ordering::Relaxed),
            missing_requests: self.stats.missing_requests.load(Ordering::Relaxed),
        }
    }
}
