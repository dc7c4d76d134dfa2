//! StorageApi and ReachabilityProbe trait definitions
//!
//! These traits decouple the diagnostic handlers from the HTTP adapter so the
//! handlers can be driven by mocks in tests. The data types are read-only
//! views of what the remote service reports; nothing here is cached.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::path::ObjectPath;

/// A storage bucket as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bucket {
    /// Bucket identifier
    pub id: String,

    /// Bucket name
    pub name: String,

    /// Whether objects are served without authentication
    pub public: bool,

    /// Creation time as reported (RFC 3339)
    pub created_at: Option<String>,

    /// Per-object size limit in bytes
    pub file_size_limit: Option<u64>,

    /// Allowed MIME types; `None` or empty means any
    pub allowed_mime_types: Option<Vec<String>>,
}

impl Bucket {
    /// Create a bucket view with only the required fields set
    pub fn new(id: impl Into<String>, name: impl Into<String>, public: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            public,
            created_at: None,
            file_size_limit: None,
            allowed_mime_types: None,
        }
    }

    /// MIME restriction, if the bucket has a non-empty one
    pub fn mime_restriction(&self) -> Option<&[String]> {
        self.allowed_mime_types
            .as_deref()
            .filter(|types| !types.is_empty())
    }
}

/// Object metadata attached to file entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectMetadata {
    pub size: Option<u64>,
    pub mimetype: Option<String>,
}

/// Kind of a listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of an object listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageEntry {
    /// Name relative to the listed prefix
    pub name: String,

    /// Object identifier; folders have none
    pub id: Option<String>,

    /// Last update time as reported (RFC 3339)
    pub updated_at: Option<String>,

    /// Object metadata, absent for folders
    pub metadata: Option<ObjectMetadata>,
}

impl StorageEntry {
    /// Create a file entry
    pub fn file(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
            updated_at: None,
            metadata: None,
        }
    }

    /// Create a folder entry
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            updated_at: None,
            metadata: None,
        }
    }

    /// Entries without an identifier are folders
    pub fn kind(&self) -> EntryKind {
        if self.id.is_some() {
            EntryKind::File
        } else {
            EntryKind::Directory
        }
    }

    /// Size in bytes, 0 when unknown
    pub fn size_bytes(&self) -> u64 {
        self.metadata.as_ref().and_then(|m| m.size).unwrap_or(0)
    }

    /// MIME type, "N/A" when unknown
    pub fn mime_type(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.mimetype.as_deref())
            .unwrap_or("N/A")
    }
}

/// Options for list operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Folder prefix to list (empty for bucket root)
    pub prefix: String,

    /// Maximum number of entries to return
    pub limit: u32,

    /// Number of entries to skip
    pub offset: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            limit: 100,
            offset: 0,
        }
    }
}

/// Options for uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Content-Type of the body
    pub content_type: String,

    /// Cache-control max-age in seconds
    pub cache_control: String,

    /// Overwrite an existing object at the same path
    pub upsert: bool,
}

/// Confirmation of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Path inside the bucket
    pub path: String,

    /// Bucket-qualified path as reported by the service
    pub full_path: String,

    /// Object identifier, if reported
    pub id: Option<String>,
}

/// Downloaded object content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// The user session attached to the current credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Result of a reachability probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reachability {
    /// True iff the status is in [200, 400)
    pub accessible: bool,

    /// HTTP status, 0 when no response arrived
    pub status_code: u16,

    /// Failure description when no response arrived
    pub error: Option<String>,
}

impl Reachability {
    /// Classify a received status code
    pub fn from_status(status_code: u16) -> Self {
        Self {
            accessible: (200..400).contains(&status_code),
            status_code,
            error: None,
        }
    }

    /// No response was received
    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            accessible: false,
            status_code: 0,
            error: Some(error.into()),
        }
    }
}

/// Trait for the remote storage service
///
/// Implemented by the REST adapter and mocked in handler tests.
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// List all buckets
    async fn list_buckets(&self) -> Result<Vec<Bucket>>;

    /// List one page of entries under a prefix
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<Vec<StorageEntry>>;

    /// Store an object
    async fn upload(
        &self,
        path: &ObjectPath,
        body: Vec<u8>,
        options: UploadOptions,
    ) -> Result<UploadReceipt>;

    /// Fetch an object's content
    async fn download(&self, path: &ObjectPath) -> Result<Download>;

    /// Remove objects, returning the names the service reports as removed
    async fn remove(&self, bucket: &str, keys: &[String]) -> Result<Vec<String>>;

    /// Build the public URL for an object (no network call, no permission check)
    fn public_url(&self, path: &ObjectPath) -> Result<String>;

    /// Base URL under which public objects are served
    fn public_base_url(&self) -> String;

    /// Query the auth session bound to the current credentials
    ///
    /// Key-only credentials carry no user session; that case is reported as
    /// `Error::SessionMissing`.
    async fn current_session(&self) -> Result<AuthSession>;
}

/// Bounded-timeout reachability check
///
/// Never fails: every failure path is folded into the returned value.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Reachability;
}
