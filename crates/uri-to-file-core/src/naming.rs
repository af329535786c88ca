// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Display-name handling: reduce a provider-supplied name to a safe file name
// and split it into base name and extension.

use crate::error::{Result, UriToFileError};

/// A display name split at its last `.`.
///
/// `extension` keeps the leading dot (`".pdf"`) and is empty for names with no
/// dot at all. `base` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub base: String,
    pub extension: String,
}

impl NameParts {
    /// `<base><extension>`, the destination file name.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.base, self.extension)
    }
}

/// Keep only the final path component of a provider-reported name.
///
/// Providers are untrusted: a name like `../../shared_prefs/x.xml` must not
/// escape the output directory. Returns `None` when nothing usable remains.
pub fn sanitize_display_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let blank = last.trim().is_empty();
    if blank || last == "." || last == ".." || last.contains('\0') {
        return None;
    }
    Some(last.to_owned())
}

/// Split `name` at the last `.`.
///
/// - `report.pdf`      → (`report`, `.pdf`)
/// - `archive.tar.gz`  → (`archive.tar`, `.gz`)
/// - `README`          → (`README`, ``)
/// - `.pdf`, ``        → [`UriToFileError::FileNameUnavailable`]
pub fn split_name(name: &str) -> Result<NameParts> {
    let (base, extension) = match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    };
    if base.is_empty() {
        return Err(UriToFileError::FileNameUnavailable);
    }
    Ok(NameParts {
        base: base.to_owned(),
        extension: extension.to_owned(),
    })
}
