//! Request fingerprinting.
//!
//! The registry and the build orchestrator key everything by a 64-bit
//! fingerprint of the request. The fingerprint is a non-cryptographic hash
//! over the canonical byte encoding, so two requests with equal content
//! always collapse to the same identity no matter which producer submitted
//! them.

use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

use super::ReloadRequest;

/// Fingerprint value reserved to mean "no request".
pub const NO_REQUEST: u64 = 0;

/// Returns the canonical byte encoding of a request.
///
/// The encoding is deterministic: field order is fixed by the struct
/// definition and `bincode`'s standard configuration encodes every field the
/// same way on every platform. Equality of these bytes defines request
/// identity.
pub fn canonical_bytes(request: &ReloadRequest) -> Vec<u8> {
    // Encoding a plain data struct with no maps or floats cannot fail.
    bincode::serde::encode_to_vec(request, bincode::config::standard())
        .expect("request encoding is infallible")
}

/// Computes the 64-bit fingerprint of a request.
///
/// Deterministic and non-cryptographic; collisions are treated as
/// statistically impossible for the handful of live requests the registry
/// holds.
pub fn fingerprint(request: &ReloadRequest) -> u64 {
    let bytes = canonical_bytes(request);
    let mut hasher = DefaultHasher::new();
    hasher.write(&bytes);
    hasher.finish()
}
