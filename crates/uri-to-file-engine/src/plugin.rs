// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-facing plugin: routes method calls onto the orchestrator.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use uri_to_file_bridge::method::{MethodCall, MethodResult, Reply};
use uri_to_file_bridge::traits::PlatformBridge;
use uri_to_file_core::PluginConfig;
use uri_to_file_core::error::{Result, UriToFileError};

use crate::executor::TaskExecutor;
use crate::orchestrator::UriToFile;
use crate::sink::{Notifier, ResultDispatcher, ResultSink};

pub const METHOD_FROM_URI: &str = "fromUri";
pub const METHOD_COPY_FILE_TO_SDCARD: &str = "copyFileToSdcard";

const ARG_URI_STRING: &str = "uriString";
const ARG_FILE_PATH: &str = "filePath";

/// One plugin instance, owned by the host's main thread.
///
/// Calls are answered through the `MethodResult` passed with them. Results
/// produced by workers wait in the dispatcher until the owner drains it with
/// [`dispatch_pending`](Self::dispatch_pending) or friends.
pub struct UriToFilePlugin {
    core: UriToFile,
    dispatcher: ResultDispatcher,
}

impl UriToFilePlugin {
    /// Plugin with its own worker pool sized from `config`.
    pub fn new(bridge: Arc<dyn PlatformBridge>, config: PluginConfig) -> Result<Self> {
        let executor = Arc::new(TaskExecutor::new(config.worker_threads)?);
        Self::with_executor(bridge, executor, &config)
    }

    /// Plugin sharing an existing pool.
    pub fn with_executor(
        bridge: Arc<dyn PlatformBridge>,
        executor: Arc<TaskExecutor>,
        config: &PluginConfig,
    ) -> Result<Self> {
        Ok(Self {
            core: UriToFile::new(bridge, executor, config)?,
            dispatcher: ResultDispatcher::new(),
        })
    }

    pub fn on_method_call(&self, call: &MethodCall, result: Box<dyn MethodResult>) {
        let sink = ResultSink::new(result, self.dispatcher.queue());
        match call.method.as_str() {
            // A null or non-string URI is rejected like an unparsable one.
            METHOD_FROM_URI => match call.arguments.get(ARG_URI_STRING).and_then(Value::as_str) {
                Some(uri) => self.core.from_uri(sink, uri),
                None => sink.reject(&UriToFileError::UriNotSupported),
            },
            METHOD_COPY_FILE_TO_SDCARD => match sdcard_arguments(call) {
                Ok((file_path, uri)) => self.core.copy_file_to_sdcard(sink, &file_path, &uri),
                Err(e) => sink.reject(&e),
            },
            other => {
                debug!(method = other, "unknown method");
                sink.respond(Reply::NotImplemented);
            }
        }
    }

    /// Best-effort filesystem path for `uri`, if the platform exposes one.
    pub fn lookup_path(&self, uri: &str) -> Option<PathBuf> {
        self.core.lookup_path(uri)
    }

    /// Run the callback of every result already produced. Returns how many.
    pub fn dispatch_pending(&mut self) -> usize {
        self.dispatcher.dispatch_pending()
    }

    pub fn dispatcher_mut(&mut self) -> &mut ResultDispatcher {
        &mut self.dispatcher
    }

    /// Called from a worker whenever a result becomes ready to dispatch.
    pub fn set_notifier(&self, notify: Notifier) {
        self.dispatcher.set_notifier(notify);
    }
}

fn sdcard_arguments(call: &MethodCall) -> Result<(String, String)> {
    Ok((
        call.string_argument(ARG_FILE_PATH)?,
        call.string_argument(ARG_URI_STRING)?,
    ))
}
