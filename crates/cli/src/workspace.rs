//! Local scratch directory
//!
//! Holds generated payloads (deleted right after upload) and downloaded
//! copies (kept for inspection). The whole directory is removed on exit.

use std::io;
use std::path::{Path, PathBuf};

/// A valid 1x1 transparent PNG
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Scratch directory handle
#[derive(Debug, Clone)]
pub struct TempWorkspace {
    root: PathBuf,
}

impl TempWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside the workspace (not created)
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write a file, creating the directory on demand
    pub fn write(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.file_path(name);
        std::fs::write(&path, contents)?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote temp file");
        Ok(path)
    }

    /// Delete a single temp file; a file that is already gone is fine
    pub fn discard(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Remove the whole directory
    ///
    /// Returns whether there was anything to remove.
    pub fn cleanup(&self) -> io::Result<bool> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Name for a generated payload, unique per millisecond
pub fn generated_name(extension: &str, now: jiff::Timestamp) -> String {
    format!("test-{}.{extension}", now.as_millisecond())
}

/// Body of a generated text payload
pub fn text_payload(service_url: &str, now: jiff::Timestamp) -> String {
    format!(
        "Storage diagnostics test file\nCreated: {now}\nService: {service_url}\n\
         This file was generated by sdiag and is safe to delete.\n"
    )
}
