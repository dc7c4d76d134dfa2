//! sdiag-core: Core library for the sdiag storage diagnostics tool
//!
//! This crate provides the SDK-independent parts of sdiag, including:
//! - Credential loading and validation
//! - The optional settings file
//! - Error hint classification
//! - Object path normalization and content type inference
//! - StorageApi / ReachabilityProbe traits for the remote service
//!
//! Nothing here performs network I/O.

pub mod config;
pub mod credentials;
pub mod error;
pub mod hint;
pub mod mime;
pub mod path;
pub mod traits;

pub use config::{ColorMode, ConfigManager, Settings};
pub use credentials::{CheckStatus, ConfigCheck, Credentials, KeyKind, SessionConfig, Validation};
pub use error::{Error, Result};
pub use hint::Hint;
pub use path::{ObjectPath, join_key, normalize_key};
pub use traits::{
    AuthSession, Bucket, Download, EntryKind, ListOptions, ObjectMetadata, Reachability,
    ReachabilityProbe, StorageApi, StorageEntry, UploadOptions, UploadReceipt,
};
