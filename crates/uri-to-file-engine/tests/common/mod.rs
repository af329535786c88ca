// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for the integration suite: a directory-backed content
// provider and a plugin wired to it.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use tokio::sync::oneshot;

use uri_to_file_bridge::method::{ChannelResult, MethodCall, Reply};
use uri_to_file_bridge::stub::StubBridge;
use uri_to_file_core::PluginConfig;
use uri_to_file_engine::UriToFilePlugin;
use uri_to_file_engine::plugin::{METHOD_COPY_FILE_TO_SDCARD, METHOD_FROM_URI};

pub struct Fixture {
    pub dir: TempDir,
    pub plugin: UriToFilePlugin,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(PluginConfig::default())
    }

    pub fn with_config(config: PluginConfig) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = Arc::new(StubBridge::with_root(
            dir.path().join("content"),
            dir.path().join("files"),
        ));
        let plugin = UriToFilePlugin::new(bridge, config).expect("plugin");
        Self { dir, plugin }
    }

    /// Publish `bytes` at `content://<authority>/<path>`.
    pub fn publish(&self, authority: &str, path: &str, bytes: &[u8]) -> String {
        let file = self.dir.path().join("content").join(authority).join(path);
        fs::create_dir_all(file.parent().expect("parent")).expect("mkdir");
        fs::write(&file, bytes).expect("write");
        format!("content://{authority}/{path}")
    }

    pub fn content_file(&self, authority: &str, path: &str) -> PathBuf {
        self.dir.path().join("content").join(authority).join(path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("files").join("uri_to_file")
    }

    pub fn from_uri(&self, uri: &str) -> oneshot::Receiver<Reply> {
        self.call(MethodCall::new(METHOD_FROM_URI, json!({ "uriString": uri })))
    }

    pub fn copy_file_to_sdcard(&self, file: &Path, uri: &str) -> oneshot::Receiver<Reply> {
        self.call(MethodCall::new(
            METHOD_COPY_FILE_TO_SDCARD,
            json!({ "filePath": file.to_string_lossy(), "uriString": uri }),
        ))
    }

    pub fn call(&self, call: MethodCall) -> oneshot::Receiver<Reply> {
        let (result, rx) = ChannelResult::pair();
        self.plugin.on_method_call(&call, result);
        rx
    }

    /// Dispatch until `rx` holds its reply.
    pub fn wait(&mut self, mut rx: oneshot::Receiver<Reply>) -> Reply {
        loop {
            if let Ok(reply) = rx.try_recv() {
                return reply;
            }
            assert!(
                self.plugin.dispatcher_mut().dispatch_blocking(),
                "dispatcher closed before reply"
            );
        }
    }
}

pub fn success_path(reply: &Reply) -> PathBuf {
    match reply {
        Reply::Success(serde_json::Value::String(p)) => PathBuf::from(p),
        other => panic!("expected success, got {other:?}"),
    }
}
