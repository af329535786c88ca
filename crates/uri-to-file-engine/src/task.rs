// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background copy of one URI into app-private storage.
//
// Runs on a worker thread. Opens the provider's byte channel, truncates the
// destination and moves bytes until the source's reported size is reached.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use uri_to_file_bridge::traits::{PlatformBridge, SourceChannel};
use uri_to_file_core::SourceReference;
use uri_to_file_core::error::{Result, UriToFileError};
use uri_to_file_core::naming::NameParts;
use uri_to_file_core::types::destination_path;

/// A single copy request, ready to run on the pool.
pub struct CopyTask {
    bridge: Arc<dyn PlatformBridge>,
    source: SourceReference,
    destination: PathBuf,
}

impl CopyTask {
    pub fn new(
        bridge: Arc<dyn PlatformBridge>,
        source: SourceReference,
        output_dir: &Path,
        parts: &NameParts,
    ) -> Self {
        Self {
            bridge,
            source,
            destination: destination_path(output_dir, parts),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Copy the content and return the canonical destination path.
    ///
    /// The first failure ends the task; nothing is retried.
    #[instrument(skip(self), fields(uri = %self.source, dest = %self.destination.display()))]
    pub fn run(&self) -> Result<PathBuf> {
        let asset = self.bridge.open_asset(&self.source)?;
        debug!(declared = ?asset.declared_length(), "asset opened");
        let mut channel = asset.into_channel();

        if let Some(parent) = self.destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut dest = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.destination)?;

        let copied = transfer(channel.as_mut(), &mut dest)?;

        let canonical = fs::canonicalize(&self.destination)?;
        if canonical.as_os_str().is_empty() {
            return Err(UriToFileError::FilePathUnavailable);
        }

        info!(bytes = copied, path = %canonical.display(), "copy complete");
        Ok(canonical)
    }
}

/// Move every byte the channel reports into `dest`.
///
/// Keeps asking for the remaining range until the running total equals the
/// channel's size. A call that moves nothing while bytes remain is fatal.
pub fn transfer(channel: &mut dyn SourceChannel, dest: &mut File) -> Result<u64> {
    let size = channel.size()?;
    let mut transferred = 0u64;

    while transferred < size {
        let remaining = size - transferred;
        let moved = channel.transfer_to(dest, transferred, remaining)?;
        if moved == 0 {
            return Err(UriToFileError::TransferStalled {
                transferred,
                expected: size,
            });
        }
        transferred += moved.min(remaining);
    }

    Ok(transferred)
}
