// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// uri-to-file — copy pipeline: name resolution, background copy tasks, the
// bounded worker pool, result hand-off and the plugin's method dispatch.

pub mod executor;
pub mod external;
pub mod orchestrator;
pub mod plugin;
pub mod resolver;
pub mod sink;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use executor::TaskExecutor;
pub use orchestrator::UriToFile;
pub use plugin::UriToFilePlugin;
pub use sink::{ResultDispatcher, ResultSink};
