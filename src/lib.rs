//! Yomikata - Data loading core for a Japanese input-method engine
//!
//! This library provides the machinery that takes competing requests to load
//! a large immutable data package (dictionary, connection costs, segmenter
//! tables), picks the request that should win, materializes the runtime
//! modules from a memory-mapped file exactly once, and hands the result back
//! through a future-like handle.
//!
//! # High-Level API
//!
//! Most callers only need the [`loader::DataLoader`] facade:
//!
//! ```ignore
//! use yomikata::loader::DataLoader;
//! use yomikata::request::{EngineType, ReloadRequest};
//!
//! let loader = DataLoader::new();
//! let request = ReloadRequest::new(EngineType::Desktop, "engine.data", b"YMKT");
//!
//! let id = loader.register_request(&request);
//! let mut future = loader.build(id);
//! future.wait().await;
//! let response = future.get().expect("terminal response");
//! ```

pub mod loader;
pub mod logging;
pub mod package;
pub mod registry;
pub mod request;

/// Version of the Yomikata library.
///
/// This is synchronized with the package version in `Cargo.toml` and
/// injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
