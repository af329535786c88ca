// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory platform bridge for unit tests.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use uri_to_file_bridge::channel::ReaderChannel;
use uri_to_file_bridge::method::{MethodResult, Reply};
use uri_to_file_bridge::traits::*;
use uri_to_file_core::SourceReference;
use uri_to_file_core::error::{Result, UriToFileError};

/// How a fake content entry behaves when read.
#[derive(Clone)]
pub(crate) enum Body {
    Bytes(Vec<u8>),
    /// Reports `reported` bytes but stops producing after `bytes`.
    Stalling { bytes: Vec<u8>, reported: u64 },
    /// Opening the asset fails, as when a grant has been revoked.
    Revoked,
    /// Opening the asset fails with a non-I/O bridge error.
    Unavailable,
    /// Bytes served only after `delay` has passed.
    Delayed { bytes: Vec<u8>, delay: Duration },
}

#[derive(Clone)]
pub(crate) struct Entry {
    pub display_name: Option<String>,
    pub body: Body,
}

/// Content provider backed by a map from URI string to [`Entry`].
pub(crate) struct FakeBridge {
    files_dir: PathBuf,
    entries: Mutex<HashMap<String, Entry>>,
    data_column: Mutex<HashMap<String, String>>,
    pub display_queries: AtomicUsize,
    pub opened: AtomicUsize,
    pub outputs: Mutex<HashMap<String, Arc<Mutex<Vec<u8>>>>>,
}

impl FakeBridge {
    pub fn new(files_dir: impl Into<PathBuf>) -> Self {
        Self {
            files_dir: files_dir.into(),
            entries: Mutex::new(HashMap::new()),
            data_column: Mutex::new(HashMap::new()),
            display_queries: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
            outputs: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, uri: &str, display_name: Option<&str>, body: Body) {
        self.entries.lock().expect("entries lock").insert(
            uri.to_owned(),
            Entry {
                display_name: display_name.map(str::to_owned),
                body,
            },
        );
    }

    pub fn insert_bytes(&self, uri: &str, display_name: &str, bytes: &[u8]) {
        self.insert(uri, Some(display_name), Body::Bytes(bytes.to_vec()));
    }

    pub fn set_data_column(&self, uri: &str, path: &str) {
        self.data_column
            .lock()
            .expect("data lock")
            .insert(uri.to_owned(), path.to_owned());
    }

    pub fn output_of(&self, uri: &str) -> Option<Vec<u8>> {
        self.outputs
            .lock()
            .expect("outputs lock")
            .get(uri)
            .map(|buf| buf.lock().expect("buf lock").clone())
    }

    fn entry(&self, uri: &SourceReference) -> Option<Entry> {
        self.entries
            .lock()
            .expect("entries lock")
            .get(uri.as_str())
            .cloned()
    }
}

impl PlatformBridge for FakeBridge {
    fn platform_name(&self) -> &str {
        "Fake"
    }
}

impl ContentQuery for FakeBridge {
    fn query_display_name(&self, uri: &SourceReference) -> Result<Option<String>> {
        self.display_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.entry(uri).and_then(|e| e.display_name))
    }

    fn query_data_column(&self, uri: &SourceReference) -> Result<Option<String>> {
        if uri.as_str().contains("explode") {
            return Err(UriToFileError::Bridge("cursor blew up".into()));
        }
        Ok(self
            .data_column
            .lock()
            .expect("data lock")
            .get(uri.as_str())
            .cloned())
    }
}

impl ContentStreams for FakeBridge {
    fn open_asset(&self, uri: &SourceReference) -> Result<AssetDescriptor> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let entry = self
            .entry(uri)
            .ok_or_else(|| UriToFileError::ContentUnavailable(format!("no content at {uri}")))?;
        match entry.body {
            Body::Bytes(bytes) => {
                let len = bytes.len() as u64;
                Ok(AssetDescriptor::new(
                    Box::new(ReaderChannel::new(io::Cursor::new(bytes), len)),
                    Some(len),
                ))
            }
            Body::Stalling { bytes, reported } => Ok(AssetDescriptor::new(
                Box::new(ReaderChannel::new(io::Cursor::new(bytes), reported)),
                Some(reported),
            )),
            Body::Revoked => Err(UriToFileError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission Denial: opening provider",
            ))),
            Body::Unavailable => Err(UriToFileError::PlatformUnavailable),
            Body::Delayed { bytes, delay } => {
                std::thread::sleep(delay);
                let len = bytes.len() as u64;
                Ok(AssetDescriptor::new(
                    Box::new(ReaderChannel::new(io::Cursor::new(bytes), len)),
                    Some(len),
                ))
            }
        }
    }

    fn open_output(&self, uri: &SourceReference) -> Result<Box<dyn Write + Send>> {
        if matches!(self.entry(uri).map(|e| e.body), Some(Body::Revoked)) {
            return Err(UriToFileError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission Denial: writing provider",
            )));
        }
        let buf = Arc::new(Mutex::new(Vec::new()));
        self.outputs
            .lock()
            .expect("outputs lock")
            .insert(uri.as_str().to_owned(), buf.clone());
        Ok(Box::new(SharedWriter(buf)))
    }
}

impl AppStorage for FakeBridge {
    fn files_dir(&self) -> Result<PathBuf> {
        Ok(self.files_dir.clone())
    }
}

struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buf lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A `SourceChannel` that moves a fixed number of bytes per call.
pub(crate) struct TricklingChannel {
    pub data: Vec<u8>,
    pub read: usize,
    pub per_call: usize,
}

impl SourceChannel for TricklingChannel {
    fn size(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn transfer_to(&mut self, dest: &mut File, position: u64, count: u64) -> io::Result<u64> {
        use std::io::{Seek, SeekFrom};
        let n = self
            .per_call
            .min(count as usize)
            .min(self.data.len() - self.read);
        dest.seek(SeekFrom::Start(position))?;
        dest.write_all(&self.data[self.read..self.read + n])?;
        self.read += n;
        Ok(n as u64)
    }
}

/// [`MethodResult`] that records replies plus the thread they arrived on.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    pub replies: Arc<Mutex<Vec<(Reply, std::thread::ThreadId)>>>,
}

impl Recorder {
    pub fn result(&self) -> Box<dyn MethodResult> {
        Box::new(RecordingResult(self.replies.clone()))
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies
            .lock()
            .expect("replies lock")
            .iter()
            .map(|(r, _)| r.clone())
            .collect()
    }

    pub fn threads(&self) -> Vec<std::thread::ThreadId> {
        self.replies
            .lock()
            .expect("replies lock")
            .iter()
            .map(|(_, t)| *t)
            .collect()
    }
}

struct RecordingResult(Arc<Mutex<Vec<(Reply, std::thread::ThreadId)>>>);

impl RecordingResult {
    fn record(&self, reply: Reply) {
        self.0
            .lock()
            .expect("replies lock")
            .push((reply, std::thread::current().id()));
    }
}

impl MethodResult for RecordingResult {
    fn success(self: Box<Self>, value: serde_json::Value) {
        self.record(Reply::Success(value));
    }

    fn error(self: Box<Self>, code: &str, message: &str, _details: Option<serde_json::Value>) {
        self.record(Reply::Error {
            code: code.to_owned(),
            message: message.to_owned(),
        });
    }

    fn not_implemented(self: Box<Self>) {
        self.record(Reply::NotImplemented);
    }
}
