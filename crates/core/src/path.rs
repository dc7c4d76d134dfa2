//! Object path handling
//!
//! Object paths inside a bucket are slash-separated keys. The storage API
//! strips leading and trailing slashes and collapses repeated ones, so the
//! same normalization is applied here before a path is sent or reported.

use crate::error::{Error, Result};

/// A bucket plus an object path inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPath {
    /// Bucket name
    pub bucket: String,
    /// Normalized object key (never starts or ends with '/')
    pub key: String,
}

impl ObjectPath {
    /// Create a new ObjectPath, validating the bucket and normalizing the key
    pub fn new(bucket: &str, key: &str) -> Result<Self> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(Error::InvalidInput("Bucket name is required".into()));
        }
        if bucket.contains('/') {
            return Err(Error::InvalidInput(format!(
                "Bucket name cannot contain '/': {bucket}"
            )));
        }

        let key = normalize_key(key);
        if key.is_empty() {
            return Err(Error::InvalidInput("Object path is required".into()));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key,
        })
    }

    /// Last path segment of the key
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Strip leading/trailing slashes and collapse repeated ones
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a folder prefix and a child name
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = normalize_key(prefix);
    let name = normalize_key(name);
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name,
        (false, true) => prefix,
        (false, false) => format!("{prefix}/{name}"),
    }
}
