// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface of the desktop harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Drive the uri-to-file pipeline against a directory of fake content.
///
/// `content://<authority>/<path>` is served from `<content-root>/<authority>/<path>`.
#[derive(Debug, Parser)]
#[command(name = "uri-to-file")]
#[command(about = "Copy content:// URIs into app-private storage", long_about = None)]
pub struct Cli {
    /// Directory standing in for the platform's content providers.
    #[arg(long, value_name = "DIR")]
    pub content_root: PathBuf,

    /// App-private root; copies land in `<files-dir>/uri_to_file`.
    #[arg(long, value_name = "DIR")]
    pub files_dir: PathBuf,

    /// Concurrent copy workers.
    #[arg(long, default_value = "3", value_name = "N")]
    pub workers: usize,

    /// Remove the copies again when the harness exits.
    #[arg(long)]
    pub cleanup: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Copy one or more content URIs into private storage.
    FromUri {
        #[arg(required = true)]
        uris: Vec<String>,
    },

    /// Copy a local file out to a content URI.
    Export {
        /// Local file to copy.
        file: PathBuf,
        /// Destination content URI.
        uri: String,
    },

    /// Print the backing filesystem path of a URI, if any.
    Lookup { uri: String },
}
