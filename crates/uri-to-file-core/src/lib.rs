// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// uri-to-file — Core types, naming rules and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod naming;
pub mod types;

pub use config::PluginConfig;
pub use error::UriToFileError;
pub use types::*;
