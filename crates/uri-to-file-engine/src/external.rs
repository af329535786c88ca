// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Copy a local file out to a caller-supplied content URI.
//
// Weaker than the inbound copy: the destination length is never checked and
// the only guarantee is that every byte read from the local file was written.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use tracing::{info, instrument};

use uri_to_file_bridge::traits::PlatformBridge;
use uri_to_file_core::SourceReference;
use uri_to_file_core::error::{Result, UriToFileError};

/// Intermediate buffer size for the streamed copy.
pub const EXTERNAL_COPY_BUFFER: usize = 1024;

/// Stream `file_path` into the content behind `uri`. Returns bytes written.
///
/// Every failure is reported as [`UriToFileError::ExternalCopy`] carrying the
/// underlying error's text.
#[instrument(skip(bridge), fields(uri = %uri, file = %file_path.display()))]
pub fn copy_to_external(
    bridge: &dyn PlatformBridge,
    file_path: &Path,
    uri: &SourceReference,
) -> Result<u64> {
    let mut input = File::open(file_path).map_err(external)?;
    let mut output = bridge.open_output(uri).map_err(external)?;

    let mut buf = [0u8; EXTERNAL_COPY_BUFFER];
    let mut total = 0u64;
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(external(e)),
        };
        output.write_all(&buf[..n]).map_err(external)?;
        total += n as u64;
    }
    output.flush().map_err(external)?;

    info!(bytes = total, "external copy complete");
    Ok(total)
}

fn external(err: impl std::fmt::Display) -> UriToFileError {
    UriToFileError::ExternalCopy(err.to_string())
}
