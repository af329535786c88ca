// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method-call surface shared with the host framework.
//
// The host delivers `MethodCall`s and a boxed `MethodResult` callback; the
// plugin answers through that callback exactly once. How calls are encoded on
// the wire is the host's business; here they are plain JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use uri_to_file_core::UriToFileError;
use uri_to_file_core::error::Result;

/// An inbound call from the host framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Required string argument.
    pub fn string_argument(&self, key: &str) -> Result<String> {
        self.arguments
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| UriToFileError::InvalidArguments(format!("missing string argument `{key}`")))
    }
}

/// The host's result callback. Consumed by whichever method is invoked.
pub trait MethodResult: Send {
    fn success(self: Box<Self>, value: Value);

    fn error(self: Box<Self>, code: &str, message: &str, details: Option<Value>);

    fn not_implemented(self: Box<Self>);
}

/// A reply waiting to be handed to a [`MethodResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    Success(Value),
    Error { code: String, message: String },
    NotImplemented,
}

impl Reply {
    pub fn from_error(err: &UriToFileError) -> Self {
        Reply::Error {
            code: err.code().to_owned(),
            message: err.to_string(),
        }
    }

    /// Invoke the matching callback method.
    pub fn send_to(self, result: Box<dyn MethodResult>) {
        match self {
            Reply::Success(value) => result.success(value),
            Reply::Error { code, message } => result.error(&code, &message, None),
            Reply::NotImplemented => result.not_implemented(),
        }
    }
}

impl From<uri_to_file_core::CopyOutcome> for Reply {
    fn from(outcome: uri_to_file_core::CopyOutcome) -> Self {
        match outcome {
            uri_to_file_core::CopyOutcome::Success(path) => Reply::Success(Value::String(path)),
            uri_to_file_core::CopyOutcome::Failure { code, message } => {
                Reply::Error { code, message }
            }
        }
    }
}

/// [`MethodResult`] that forwards the reply into a oneshot channel.
///
/// Lets Rust callers (and tests) await a result instead of wiring a host
/// callback.
pub struct ChannelResult {
    tx: oneshot::Sender<Reply>,
}

impl ChannelResult {
    pub fn pair() -> (Box<dyn MethodResult>, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (Box::new(Self { tx }), rx)
    }

    fn send(self, reply: Reply) {
        if self.tx.send(reply).is_err() {
            tracing::debug!("method result receiver dropped before reply");
        }
    }
}

impl MethodResult for ChannelResult {
    fn success(self: Box<Self>, value: Value) {
        (*self).send(Reply::Success(value));
    }

    fn error(self: Box<Self>, code: &str, message: &str, _details: Option<Value>) {
        (*self).send(Reply::Error {
            code: code.to_owned(),
            message: message.to_owned(),
        });
    }

    fn not_implemented(self: Box<Self>) {
        (*self).send(Reply::NotImplemented);
    }
}
