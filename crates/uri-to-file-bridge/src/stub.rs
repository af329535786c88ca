// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where no content providers exist.
//
// An unrooted stub returns `PlatformUnavailable` for every content operation.
// A rooted stub serves `content://<authority>/<path>` out of
// `<root>/<authority>/<path>`, which is enough to drive the full copy pipeline
// from tests and the desktop harness.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uri_to_file_core::error::{Result, UriToFileError};
use uri_to_file_core::{Scheme, SourceReference};

use crate::channel::ReaderChannel;
use crate::traits::*;

/// Desktop bridge. See the module docs for the URI-to-path mapping.
pub struct StubBridge {
    content_root: Option<PathBuf>,
    files_dir: PathBuf,
}

impl StubBridge {
    /// Bridge with no content root; `files_dir` falls back to the user data
    /// directory.
    pub fn unrooted() -> Self {
        Self {
            content_root: None,
            files_dir: default_files_dir(),
        }
    }

    /// Bridge serving content from `content_root` and copying into `files_dir`.
    pub fn with_root(content_root: impl Into<PathBuf>, files_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_root: Some(content_root.into()),
            files_dir: files_dir.into(),
        }
    }

    /// Map a content URI onto the backing file.
    fn backing_path(&self, uri: &SourceReference) -> Result<PathBuf> {
        let Some(root) = self.content_root.as_deref() else {
            tracing::warn!(uri = %uri, "content access on unrooted stub bridge");
            return Err(UriToFileError::PlatformUnavailable);
        };
        if uri.scheme() != Scheme::Content {
            return Err(UriToFileError::UriNotSupported);
        }
        let authority = uri
            .authority()
            .ok_or_else(|| UriToFileError::ContentUnavailable(format!("no authority in {uri}")))?;

        let mut path = root.join(authority);
        for segment in uri.path_segments() {
            if segment == "." || segment == ".." || segment.contains(['/', '\\']) {
                return Err(UriToFileError::ContentUnavailable(format!(
                    "illegal path segment in {uri}"
                )));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl ContentQuery for StubBridge {
    fn query_display_name(&self, uri: &SourceReference) -> Result<Option<String>> {
        let path = self.backing_path(uri)?;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()))
    }

    fn query_data_column(&self, uri: &SourceReference) -> Result<Option<String>> {
        let path = self.backing_path(uri)?;
        Ok(path
            .is_file()
            .then(|| path.to_string_lossy().into_owned()))
    }
}

impl ContentStreams for StubBridge {
    fn open_asset(&self, uri: &SourceReference) -> Result<AssetDescriptor> {
        let path = self.backing_path(uri)?;
        let file = File::open(&path).map_err(|e| not_reachable(&path, e))?;
        let channel = ReaderChannel::from_file(file)?;
        let length = channel.size()?;
        Ok(AssetDescriptor::new(Box::new(channel), Some(length)))
    }

    fn open_output(&self, uri: &SourceReference) -> Result<Box<dyn Write + Send>> {
        let path = self.backing_path(uri)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        Ok(Box::new(file))
    }
}

impl AppStorage for StubBridge {
    fn files_dir(&self) -> Result<PathBuf> {
        Ok(self.files_dir.clone())
    }
}

fn not_reachable(path: &Path, err: io::Error) -> UriToFileError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            UriToFileError::ContentUnavailable(format!("no content at {}", path.display()))
        }
        _ => UriToFileError::Io(err),
    }
}

/// Conventional per-user data location on desktop.
fn default_files_dir() -> PathBuf {
    // Try XDG data dir, then fallback to home
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    };
    base.join("uri-to-file")
}
