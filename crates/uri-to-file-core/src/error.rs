// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for uri-to-file.

use thiserror::Error;

/// Bridge error code for URIs that cannot be parsed or are not `content://`.
pub const CODE_URI_NOT_SUPPORTED: &str = "URI_NOT_SUPPORTED";
/// Bridge error code for every metadata and I/O failure of the copy pipeline.
pub const CODE_IO_EXCEPTION: &str = "IO_EXCEPTION";
/// Bridge error code when the local file handed to `copyFileToSdcard` is missing.
pub const CODE_FILE_NOT_FOUND: &str = "-1";
/// Bridge error code for any failure inside `copyFileToSdcard` itself.
pub const CODE_EXTERNAL_COPY: &str = "";
/// Bridge error code for malformed method-call arguments.
pub const CODE_INVALID_ARGUMENTS: &str = "INVALID_ARGUMENTS";
/// Bridge error code for capabilities the current platform lacks.
pub const CODE_PLATFORM_UNAVAILABLE: &str = "PLATFORM_UNAVAILABLE";

/// Top-level error type for all uri-to-file operations.
#[derive(Debug, Error)]
pub enum UriToFileError {
    // -- Input rejected --
    #[error("Uri not supported")]
    UriNotSupported,

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    // -- Metadata resolution --
    #[error("Unable to fetch filename")]
    FileNameUnavailable,

    #[error("Unable to fetch filepath")]
    FilePathUnavailable,

    // -- Copy pipeline --
    #[error("content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("transfer stalled after {transferred} of {expected} bytes")]
    TransferStalled { transferred: u64, expected: u64 },

    #[error("file is not exists")]
    SourceFileMissing,

    #[error("{0}")]
    ExternalCopy(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl UriToFileError {
    /// The string code reported across the bridge alongside [`Self::to_string`].
    pub fn code(&self) -> &'static str {
        match self {
            UriToFileError::UriNotSupported => CODE_URI_NOT_SUPPORTED,
            UriToFileError::InvalidArguments(_) => CODE_INVALID_ARGUMENTS,
            UriToFileError::SourceFileMissing => CODE_FILE_NOT_FOUND,
            UriToFileError::ExternalCopy(_) => CODE_EXTERNAL_COPY,
            UriToFileError::PlatformUnavailable => CODE_PLATFORM_UNAVAILABLE,
            UriToFileError::FileNameUnavailable
            | UriToFileError::FilePathUnavailable
            | UriToFileError::ContentUnavailable(_)
            | UriToFileError::TransferStalled { .. }
            | UriToFileError::Io(_)
            | UriToFileError::Serialization(_)
            | UriToFileError::Bridge(_) => CODE_IO_EXCEPTION,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UriToFileError>;
