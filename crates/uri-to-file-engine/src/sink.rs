// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-fire result delivery and the hand-off back to the originating thread.
//
// Host frameworks insist that method results are completed on the thread that
// received the call. Workers therefore never touch the host callback: they
// post a `Completion` onto the dispatcher's queue, and the originating thread
// drains that queue and invokes the callbacks itself.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use uri_to_file_bridge::method::{MethodResult, Reply};
use uri_to_file_core::UriToFileError;
use uri_to_file_core::error::CODE_IO_EXCEPTION;

/// Callback used to wake the originating thread's event loop.
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

/// A reply paired with the callback it belongs to.
pub struct Completion {
    result: Box<dyn MethodResult>,
    reply: Reply,
}

impl Completion {
    /// Invoke the host callback. Must run on the originating thread.
    pub fn complete(self) {
        self.reply.send_to(self.result);
    }
}

/// Sending half of the originating thread's completion queue.
#[derive(Clone)]
pub struct CompletionQueue {
    tx: UnboundedSender<Completion>,
    notifier: Arc<Mutex<Option<Notifier>>>,
}

impl CompletionQueue {
    fn post(&self, completion: Completion) {
        if self.tx.send(completion).is_err() {
            warn!("result dispatcher gone; dropping completion");
            return;
        }
        let notifier = self
            .notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(notify) = notifier {
            notify();
        }
    }
}

/// Receiving half, owned by the originating thread.
pub struct ResultDispatcher {
    rx: UnboundedReceiver<Completion>,
    queue: CompletionQueue,
}

impl ResultDispatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rx,
            queue: CompletionQueue {
                tx,
                notifier: Arc::new(Mutex::new(None)),
            },
        }
    }

    /// Handle for posting completions from any thread.
    pub fn queue(&self) -> CompletionQueue {
        self.queue.clone()
    }

    /// Install a callback run after every posted completion (e.g. to post a
    /// message to the platform's main looper).
    pub fn set_notifier(&self, notify: Notifier) {
        *self
            .queue
            .notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(notify);
    }

    /// Complete everything already queued, without blocking.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(completion) = self.rx.try_recv() {
            completion.complete();
            count += 1;
        }
        count
    }

    /// Block until one completion arrives and complete it.
    ///
    /// Must not be called from inside an async runtime.
    pub fn dispatch_blocking(&mut self) -> bool {
        match self.rx.blocking_recv() {
            Some(completion) => {
                completion.complete();
                true
            }
            None => false,
        }
    }

    /// Await one completion and complete it.
    pub async fn dispatch_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(completion) => {
                completion.complete();
                true
            }
            None => false,
        }
    }
}

impl Default for ResultDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-fire result for one request.
///
/// Both completion methods consume the sink, so at most one reply is ever
/// sent. A sink dropped without replying (its task panicked or was abandoned)
/// reports an `IO_EXCEPTION` instead of leaving the caller hanging.
pub struct ResultSink {
    slot: Option<(Box<dyn MethodResult>, CompletionQueue)>,
}

impl ResultSink {
    pub fn new(result: Box<dyn MethodResult>, queue: CompletionQueue) -> Self {
        Self {
            slot: Some((result, queue)),
        }
    }

    /// Reply from the originating thread, immediately.
    pub fn respond(mut self, reply: Reply) {
        if let Some((result, _)) = self.slot.take() {
            reply.send_to(result);
        }
    }

    /// Reply with an error from the originating thread, immediately.
    pub fn reject(self, err: &UriToFileError) {
        debug!(code = err.code(), error = %err, "request rejected");
        self.respond(Reply::from_error(err));
    }

    /// Reply from any thread via the originating thread's queue.
    pub fn deliver(mut self, reply: Reply) {
        self.post(reply);
    }

    fn post(&mut self, reply: Reply) {
        if let Some((result, queue)) = self.slot.take() {
            queue.post(Completion { result, reply });
        }
    }
}

impl Drop for ResultSink {
    fn drop(&mut self) {
        if self.slot.is_some() {
            warn!("result sink dropped without a reply");
            self.post(Reply::Error {
                code: CODE_IO_EXCEPTION.to_owned(),
                message: "copy task aborted before reporting".to_owned(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn respond_is_immediate() {
        let dispatcher = ResultDispatcher::new();
        let recorder = Recorder::default();
        ResultSink::new(recorder.result(), dispatcher.queue()).respond(Reply::Success(json!(true)));
        assert_eq!(recorder.replies(), vec![Reply::Success(json!(true))]);
    }

    #[test]
    fn reject_uses_error_code_and_message() {
        let dispatcher = ResultDispatcher::new();
        let recorder = Recorder::default();
        ResultSink::new(recorder.result(), dispatcher.queue())
            .reject(&UriToFileError::UriNotSupported);
        assert_eq!(
            recorder.replies(),
            vec![Reply::Error {
                code: "URI_NOT_SUPPORTED".into(),
                message: "Uri not supported".into()
            }]
        );
    }

    #[test]
    fn delivery_from_worker_completes_on_dispatching_thread() {
        let mut dispatcher = ResultDispatcher::new();
        let recorder = Recorder::default();
        let sink = ResultSink::new(recorder.result(), dispatcher.queue());

        std::thread::spawn(move || sink.deliver(Reply::Success(json!("/tmp/a.pdf"))))
            .join()
            .expect("worker");

        // Nothing reaches the callback until the originating thread dispatches.
        assert!(recorder.replies().is_empty());
        assert_eq!(dispatcher.dispatch_pending(), 1);
        assert_eq!(recorder.replies(), vec![Reply::Success(json!("/tmp/a.pdf"))]);
        assert_eq!(recorder.threads(), vec![std::thread::current().id()]);
    }

    #[test]
    fn dropped_sink_still_reports_once() {
        let mut dispatcher = ResultDispatcher::new();
        let recorder = Recorder::default();
        drop(ResultSink::new(recorder.result(), dispatcher.queue()));

        assert_eq!(dispatcher.dispatch_pending(), 1);
        assert_eq!(dispatcher.dispatch_pending(), 0);
        assert_eq!(
            recorder.replies(),
            vec![Reply::Error {
                code: "IO_EXCEPTION".into(),
                message: "copy task aborted before reporting".into()
            }]
        );
    }

    #[test]
    fn notifier_fires_per_completion() {
        let mut dispatcher = ResultDispatcher::new();
        let pings = Arc::new(AtomicUsize::new(0));
        let counter = pings.clone();
        dispatcher.set_notifier(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let recorder = Recorder::default();
        ResultSink::new(recorder.result(), dispatcher.queue()).deliver(Reply::Success(json!(1)));
        ResultSink::new(recorder.result(), dispatcher.queue()).deliver(Reply::Success(json!(2)));

        assert_eq!(pings.load(Ordering::SeqCst), 2);
        assert_eq!(dispatcher.dispatch_pending(), 2);
    }

    #[test]
    fn dispatch_blocking_waits_for_worker() {
        let mut dispatcher = ResultDispatcher::new();
        let recorder = Recorder::default();
        let sink = ResultSink::new(recorder.result(), dispatcher.queue());
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            sink.deliver(Reply::NotImplemented);
        });
        assert!(dispatcher.dispatch_blocking());
        assert_eq!(recorder.replies(), vec![Reply::NotImplemented]);
    }
}
