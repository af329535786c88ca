// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// The copy pipeline never touches a platform API directly. Everything it needs
// from the OS (metadata queries, byte channels, the app-private directory)
// goes through these traits.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use uri_to_file_core::SourceReference;
use uri_to_file_core::error::Result;

/// Unified bridge that groups all native capabilities.
///
/// Shared between the calling thread and every copy worker, hence the
/// `Send + Sync` bound.
pub trait PlatformBridge: ContentQuery + ContentStreams + AppStorage + Send + Sync {
    /// Human-readable platform name (e.g. "Android", "Desktop (stub)").
    fn platform_name(&self) -> &str;
}

/// Structured metadata lookups against a content provider.
pub trait ContentQuery {
    /// Value of the provider's display-name column for `uri`.
    ///
    /// Returns `Ok(None)` when the query yields no row or no such column.
    /// Implementations must release any cursor they open on every path.
    fn query_display_name(&self, uri: &SourceReference) -> Result<Option<String>>;

    /// Value of the legacy `_data` column (a raw filesystem path some
    /// providers still expose).
    fn query_data_column(&self, uri: &SourceReference) -> Result<Option<String>>;
}

/// Byte-level access to content referenced by a URI.
pub trait ContentStreams {
    /// Open a read-only asset descriptor for `uri`.
    ///
    /// Fails hard when the content is no longer reachable (permission
    /// revoked, provider gone).
    fn open_asset(&self, uri: &SourceReference) -> Result<AssetDescriptor>;

    /// Open a writable stream that replaces the content behind `uri`.
    fn open_output(&self, uri: &SourceReference) -> Result<Box<dyn Write + Send>>;
}

/// The application's private storage root.
pub trait AppStorage {
    /// Directory only this app can read (`Context.getFilesDir()` on Android).
    fn files_dir(&self) -> Result<PathBuf>;
}

/// A readable byte channel with a known size.
///
/// Mirrors a positional channel transfer: each call moves *up to* `count`
/// bytes and may move fewer, so callers must loop.
pub trait SourceChannel: Send {
    /// Number of bytes the source reports it holds.
    fn size(&self) -> io::Result<u64>;

    /// Move up to `count` bytes into `dest` starting at byte `position` of
    /// `dest`. Returns how many bytes were moved; `0` means no progress.
    fn transfer_to(&mut self, dest: &mut File, position: u64, count: u64) -> io::Result<u64>;
}

/// Handle onto provider content: a byte channel plus the length the provider
/// declared when the descriptor was opened.
pub struct AssetDescriptor {
    channel: Box<dyn SourceChannel>,
    declared_length: Option<u64>,
}

impl AssetDescriptor {
    /// `declared_length` is `None` when the provider reports an unknown length.
    pub fn new(channel: Box<dyn SourceChannel>, declared_length: Option<u64>) -> Self {
        Self {
            channel,
            declared_length,
        }
    }

    pub fn declared_length(&self) -> Option<u64> {
        self.declared_length
    }

    pub fn into_channel(self) -> Box<dyn SourceChannel> {
        self.channel
    }
}

impl std::fmt::Debug for AssetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetDescriptor")
            .field("declared_length", &self.declared_length)
            .finish_non_exhaustive()
    }
}
