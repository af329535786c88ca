// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// uri-to-file — desktop harness
//
// Entry point. Initialises logging, wires the plugin to a directory-backed
// bridge and prints one JSON reply per request.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tokio::sync::oneshot;

use uri_to_file_bridge::method::{ChannelResult, MethodCall, Reply};
use uri_to_file_bridge::stub::StubBridge;
use uri_to_file_core::PluginConfig;
use uri_to_file_core::error::{CODE_IO_EXCEPTION, Result};
use uri_to_file_engine::UriToFilePlugin;
use uri_to_file_engine::plugin::{METHOD_COPY_FILE_TO_SDCARD, METHOD_FROM_URI};

use cli::{Cli, CliCommand};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(code = e.code(), error = %e, "harness failed");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every request succeeded.
fn run(cli: Cli) -> Result<bool> {
    let bridge = Arc::new(StubBridge::with_root(&cli.content_root, &cli.files_dir));
    let config = PluginConfig {
        files_dir: Some(cli.files_dir.clone()),
        worker_threads: cli.workers,
        delete_on_exit: cli.cleanup,
        ..PluginConfig::default()
    };
    let mut plugin = UriToFilePlugin::new(bridge, config)?;

    let calls: Vec<(String, MethodCall)> = match cli.command {
        CliCommand::FromUri { uris } => uris
            .into_iter()
            .map(|uri| {
                let call = MethodCall::new(METHOD_FROM_URI, json!({ "uriString": uri }));
                (uri, call)
            })
            .collect(),
        CliCommand::Export { file, uri } => {
            let call = MethodCall::new(
                METHOD_COPY_FILE_TO_SDCARD,
                json!({ "filePath": file.to_string_lossy(), "uriString": uri }),
            );
            vec![(uri, call)]
        }
        CliCommand::Lookup { uri } => {
            let path = plugin.lookup_path(&uri);
            println!("{}", json!({ "uri": uri, "path": path }));
            return Ok(path.is_some());
        }
    };

    let pending: Vec<(String, oneshot::Receiver<Reply>)> = calls
        .into_iter()
        .map(|(uri, call)| {
            let (result, rx) = ChannelResult::pair();
            plugin.on_method_call(&call, result);
            (uri, rx)
        })
        .collect();

    let mut all_ok = true;
    for (uri, mut rx) in pending {
        let reply = loop {
            match rx.try_recv() {
                Ok(reply) => break reply,
                Err(oneshot::error::TryRecvError::Empty) => {
                    plugin.dispatcher_mut().dispatch_blocking();
                }
                Err(oneshot::error::TryRecvError::Closed) => {
                    break Reply::Error {
                        code: CODE_IO_EXCEPTION.to_owned(),
                        message: "request finished without a reply".to_owned(),
                    };
                }
            }
        };
        all_ok &= matches!(reply, Reply::Success(_));
        println!("{}", json!({ "uri": uri, "reply": reply }));
    }
    Ok(all_ok)
}
