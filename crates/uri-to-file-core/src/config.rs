// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for a plugin instance.
///
/// Hosts normally keep the defaults; the struct is serde-friendly so it can be
/// passed across the bridge as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// App-private root. `None` means "ask the platform bridge".
    pub files_dir: Option<PathBuf>,
    /// Subdirectory of the private root that receives copies.
    pub output_dir_name: String,
    /// Size of the copy worker pool.
    pub worker_threads: usize,
    /// Remove copied files when the plugin is dropped.
    pub delete_on_exit: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            files_dir: None,
            output_dir_name: "uri_to_file".into(),
            worker_threads: 3,
            delete_on_exit: true,
        }
    }
}

impl PluginConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Directory receiving copies under the given private root.
    pub fn output_dir(&self, files_dir: &Path) -> PathBuf {
        files_dir.join(&self.output_dir_name)
    }
}
