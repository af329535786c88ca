// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the uri-to-file pipeline.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CODE_IO_EXCEPTION, Result, UriToFileError};

/// URI scheme of an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    /// `content://`: provider-mediated content (what system pickers hand out).
    Content,
    /// `file://`: a direct filesystem reference.
    File,
    /// Anything else (`http`, `data`, ...).
    Unsupported,
}

impl Scheme {
    /// Classify by the scheme exactly as written; `CONTENT://` is unsupported.
    fn from_raw(uri: &str) -> Self {
        match uri.split_once(':').map(|(scheme, _)| scheme) {
            Some("content") => Scheme::Content,
            Some("file") => Scheme::File,
            _ => Scheme::Unsupported,
        }
    }
}

/// An opaque URI plus its scheme. Immutable once parsed.
///
/// The caller's string is kept verbatim and is what reaches the platform;
/// the parsed form only serves structural lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    raw: String,
    url: Url,
    scheme: Scheme,
}

impl SourceReference {
    /// Parse a URI string as received over the bridge.
    ///
    /// Fails with [`UriToFileError::UriNotSupported`] for empty or unparsable
    /// input. Unsupported schemes still parse; callers inspect [`Self::scheme`].
    pub fn parse(uri: &str) -> Result<Self> {
        if uri.trim().is_empty() {
            return Err(UriToFileError::UriNotSupported);
        }
        let url = Url::parse(uri).map_err(|_| UriToFileError::UriNotSupported)?;
        Ok(Self {
            raw: uri.to_owned(),
            scheme: Scheme::from_raw(uri),
            url,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Provider authority (`com.android.providers.downloads.documents`, ...).
    pub fn authority(&self) -> Option<&str> {
        self.url.host_str().filter(|h| !h.is_empty())
    }

    /// Percent-decoded path segments, empty segments dropped.
    pub fn path_segments(&self) -> Vec<String> {
        self.url
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect()
    }

    /// Final decoded path segment, if the path has one.
    pub fn last_path_segment(&self) -> Option<String> {
        self.path_segments().pop()
    }

    /// Local filesystem path for `file://` URIs.
    pub fn file_path(&self) -> Option<PathBuf> {
        match self.scheme {
            Scheme::File => self.url.to_file_path().ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Result of one copy request. Exactly one is produced per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyOutcome {
    /// Canonical path of the copied file.
    Success(String),
    /// Bridge error code and message.
    Failure { code: String, message: String },
}

impl CopyOutcome {
    /// Failure of a background copy. Whatever went wrong while opening,
    /// transferring or canonicalizing, the caller sees `IO_EXCEPTION`.
    pub fn io_failure(err: &UriToFileError) -> Self {
        CopyOutcome::Failure {
            code: CODE_IO_EXCEPTION.to_owned(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CopyOutcome::Success(_))
    }
}

/// Outcome of a background copy task; see [`CopyOutcome::io_failure`].
impl From<Result<PathBuf>> for CopyOutcome {
    fn from(result: Result<PathBuf>) -> Self {
        match result {
            Ok(path) => CopyOutcome::Success(path.to_string_lossy().into_owned()),
            Err(e) => CopyOutcome::io_failure(&e),
        }
    }
}

/// Destination of a copy: `<files_dir>/<output_dir_name>/<base><extension>`.
pub fn destination_path(output_dir: &Path, parts: &crate::naming::NameParts) -> PathBuf {
    output_dir.join(parts.file_name())
}
