//! sdiag-rest: Storage REST adapter for sdiag
//!
//! This crate provides the implementation of the StorageApi trait over the
//! service's HTTP API, plus the reachability prober. It is the only crate
//! that performs network I/O.

pub mod client;
pub mod probe;

pub use client::StorageClient;
pub use probe::{DEFAULT_TIMEOUT, HttpProber};
