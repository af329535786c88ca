// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Display-name resolution and the legacy best-effort path lookup.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use uri_to_file_bridge::traits::PlatformBridge;
use uri_to_file_core::naming::sanitize_display_name;
use uri_to_file_core::{Scheme, SourceReference};

/// Determines the human-readable name of the content behind a URI.
#[derive(Clone)]
pub struct NameResolver {
    bridge: Arc<dyn PlatformBridge>,
}

impl NameResolver {
    pub fn new(bridge: Arc<dyn PlatformBridge>) -> Self {
        Self { bridge }
    }

    /// Display name for `uri`, or `None` when nothing usable is known.
    ///
    /// The provider's display-name column wins; when the query has no row or
    /// no such column the URI's last path segment is used instead. A provider
    /// error counts as "no row". The result is reduced to a bare file name.
    pub fn resolve(&self, uri: &SourceReference) -> Option<String> {
        let queried = match self.bridge.query_display_name(uri) {
            Ok(name) => name,
            Err(e) => {
                warn!(uri = %uri, error = %e, "display name query failed");
                None
            }
        };

        let raw = match queried {
            Some(name) => name,
            None => {
                let segment = uri.last_path_segment()?;
                debug!(uri = %uri, segment = %segment, "falling back to last path segment");
                segment
            }
        };
        sanitize_display_name(&raw)
    }
}

/// Best-effort direct filesystem path for a URI.
///
/// `content://` URIs consult the provider's legacy `_data` column, `file://`
/// URIs yield their own path, anything else yields `None`. Every failure
/// along the way also yields `None`.
pub fn lookup_path(bridge: &dyn PlatformBridge, uri: &str) -> Option<PathBuf> {
    let source = SourceReference::parse(uri).ok()?;
    match source.scheme() {
        Scheme::Content => bridge
            .query_data_column(&source)
            .ok()
            .flatten()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from),
        Scheme::File => source.file_path(),
        Scheme::Unsupported => None,
    }
}
