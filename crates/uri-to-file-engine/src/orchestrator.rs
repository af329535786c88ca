// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request orchestration: validate on the calling thread, copy on the pool.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use uri_to_file_bridge::method::Reply;
use uri_to_file_bridge::traits::PlatformBridge;
use uri_to_file_core::error::{Result, UriToFileError};
use uri_to_file_core::naming::{NameParts, split_name};
use uri_to_file_core::{CopyOutcome, PluginConfig, Scheme, SourceReference};

use crate::executor::TaskExecutor;
use crate::external::copy_to_external;
use crate::resolver::{self, NameResolver};
use crate::sink::ResultSink;
use crate::task::CopyTask;

/// Copies written by this instance.
///
/// Every in-flight copy job holds a handle, so the files are removed only
/// once the orchestrator and all of its outstanding jobs are gone.
#[derive(Clone, Default)]
struct CleanupRegistry(Arc<WrittenFiles>);

#[derive(Default)]
struct WrittenFiles(Mutex<HashSet<PathBuf>>);

impl CleanupRegistry {
    fn register(&self, path: PathBuf) {
        self.0
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path);
    }
}

impl Drop for WrittenFiles {
    fn drop(&mut self) {
        let paths = self.0.get_mut().unwrap_or_else(PoisonError::into_inner);
        for path in paths.drain() {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed copy"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove copy"),
            }
        }
    }
}

/// Entry point for copy requests.
///
/// Validation (URI, scheme, display name) happens synchronously and is
/// rejected straight away; everything touching the filesystem is handed to
/// the executor.
pub struct UriToFile {
    bridge: Arc<dyn PlatformBridge>,
    executor: Arc<TaskExecutor>,
    resolver: NameResolver,
    output_dir: PathBuf,
    /// Present when copies are deleted on exit.
    written: Option<CleanupRegistry>,
}

impl UriToFile {
    pub fn new(
        bridge: Arc<dyn PlatformBridge>,
        executor: Arc<TaskExecutor>,
        config: &PluginConfig,
    ) -> Result<Self> {
        let files_dir = match &config.files_dir {
            Some(dir) => dir.clone(),
            None => bridge.files_dir()?,
        };
        let output_dir = config.output_dir(&files_dir);
        info!(
            platform = bridge.platform_name(),
            output_dir = %output_dir.display(),
            workers = executor.workers(),
            "uri-to-file ready"
        );
        Ok(Self {
            resolver: NameResolver::new(bridge.clone()),
            bridge,
            executor,
            output_dir,
            written: config.delete_on_exit.then(CleanupRegistry::default),
        })
    }

    /// Directory that receives every copy.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Copy the content behind `uri` into private storage.
    ///
    /// The sink receives the canonical path of the copy, or a failure. Input
    /// and naming failures are reported before this returns; copy results
    /// arrive later through the sink's dispatcher.
    #[instrument(skip(self, sink))]
    pub fn from_uri(&self, sink: ResultSink, uri: &str) {
        let (source, parts) = match self.prepare(uri) {
            Ok(prepared) => prepared,
            Err(e) => {
                sink.reject(&e);
                return;
            }
        };

        let task = CopyTask::new(self.bridge.clone(), source, &self.output_dir, &parts);
        debug!(dest = %task.destination().display(), "queueing copy");

        let registry = self.written.clone();
        self.executor.submit(move || {
            let result = task.run();
            // Released before replying: if this was the last handle the copy
            // is already purged when the caller hears about it.
            if let Some(registry) = registry {
                if let Ok(path) = &result {
                    registry.register(path.clone());
                }
            }
            sink.deliver(CopyOutcome::from(result).into());
        });
    }

    fn prepare(&self, uri: &str) -> Result<(SourceReference, NameParts)> {
        let source = SourceReference::parse(uri)?;
        if source.scheme() != Scheme::Content {
            return Err(UriToFileError::UriNotSupported);
        }
        let name = self
            .resolver
            .resolve(&source)
            .ok_or(UriToFileError::FileNameUnavailable)?;
        let parts = split_name(&name)?;
        Ok((source, parts))
    }

    /// Stream the local file at `file_path` into the content behind `uri`.
    ///
    /// Replies `true` on success. A missing local file is `-1`; any other
    /// copy failure carries an empty code and the error text.
    #[instrument(skip(self, sink))]
    pub fn copy_file_to_sdcard(&self, sink: ResultSink, file_path: &str, uri: &str) {
        let target = match SourceReference::parse(uri) {
            Ok(target) => target,
            Err(e) => {
                sink.reject(&e);
                return;
            }
        };
        let local = PathBuf::from(file_path);
        let bridge = self.bridge.clone();

        self.executor.submit(move || {
            let reply = if !local.exists() {
                Reply::from_error(&UriToFileError::SourceFileMissing)
            } else {
                match copy_to_external(bridge.as_ref(), &local, &target) {
                    Ok(_) => Reply::Success(Value::Bool(true)),
                    Err(e) => {
                        warn!(error = %e, "external copy failed");
                        Reply::from_error(&e)
                    }
                }
            };
            sink.deliver(reply);
        });
    }

    /// Best-effort filesystem path for `uri`; see [`resolver::lookup_path`].
    pub fn lookup_path(&self, uri: &str) -> Option<PathBuf> {
        resolver::lookup_path(self.bridge.as_ref(), uri)
    }
}
