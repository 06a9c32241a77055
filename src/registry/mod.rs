//! Request priority registry.
//!
//! Producers keep re-submitting their latest known reload request; the
//! registry deduplicates them by fingerprint, ranks them, and nominates the
//! one the engine should build next. Ranking is by numeric priority (0 is
//! highest), with ties broken by registration recency: a monotonically
//! increasing sequence number is stamped on every registration, and among
//! entries of equal priority the freshest stamp wins.
//!
//! Failed requests are soft-deleted rather than erased. A request that
//! failed to load keeps its entry with an `unregistered` mark, so when the
//! identical request arrives again it is reactivated in place with its
//! priority memory intact.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::request::{fingerprint, ReloadRequest, NO_REQUEST};

/// One registered request with its ranking state.
struct RegistryEntry {
    request: ReloadRequest,
    priority: i32,
    sequence: u64,
    unregistered: bool,
}

struct RegistryInner {
    entries: HashMap<u64, RegistryEntry>,
    next_sequence: u64,
}

impl RegistryInner {
    /// Fingerprint of the best eligible entry, or [`NO_REQUEST`].
    ///
    /// Smaller priority wins; among equal priorities the freshest sequence
    /// stamp wins. Unregistered entries are never eligible. The scan is
    /// linear; the registry holds single-digit entry counts in practice.
    fn top(&self) -> u64 {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.unregistered)
            .max_by_key(|(_, entry)| (std::cmp::Reverse(entry.priority), entry.sequence))
            .map(|(id, _)| *id)
            .unwrap_or(NO_REQUEST)
    }
}

/// Deduplicating priority registry for reload requests.
///
/// All operations take the registry's internal lock; none of them can fail.
/// Invalid request content is diagnosed later by the package loader, not
/// here.
pub struct RequestRegistry {
    inner: Mutex<RegistryInner>,
}

impl RequestRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                entries: HashMap::new(),
                next_sequence: 0,
            }),
        }
    }

    /// Registers a request and returns the current top fingerprint.
    ///
    /// Registering a request whose fingerprint is already present refreshes
    /// the entry: the sequence stamp advances, the priority is taken from
    /// the incoming request, and any `unregistered` mark is cleared.
    pub fn register_request(&self, request: &ReloadRequest) -> u64 {
        let id = fingerprint(request);
        let mut inner = self.inner.lock();
        inner.next_sequence += 1;
        let sequence = inner.next_sequence;
        inner.entries.insert(
            id,
            RegistryEntry {
                request: request.clone(),
                priority: request.priority,
                sequence,
                unregistered: false,
            },
        );
        let top = inner.top();
        debug!(
            id,
            top,
            priority = request.priority,
            path = %request.file_path,
            "registered reload request"
        );
        top
    }

    /// Marks the request as failed and returns the current top fingerprint.
    ///
    /// The entry stays in the registry with an `unregistered` mark so that a
    /// verbatim re-registration reactivates it. Unknown fingerprints are
    /// ignored.
    pub fn report_load_failure(&self, id: u64) -> u64 {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entries.get_mut(&id) {
            entry.unregistered = true;
            debug!(id, "unregistered reload request after load failure");
        }
        inner.top()
    }

    /// Fingerprint of the best eligible entry, or [`NO_REQUEST`] if none.
    pub fn top(&self) -> u64 {
        self.inner.lock().top()
    }

    /// Returns the request registered under `id`, if it is eligible.
    ///
    /// Unregistered entries resolve to `None`: a failed request cannot be
    /// built again until it is re-registered.
    pub fn request_for(&self, id: u64) -> Option<ReloadRequest> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(&id)
            .filter(|entry| !entry.unregistered)
            .map(|entry| entry.request.clone())
    }

    /// Number of entries, including unregistered ones.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if the registry holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Removes every entry and resets the sequence counter.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.next_sequence = 0;
        debug!("cleared request registry");
    }
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
