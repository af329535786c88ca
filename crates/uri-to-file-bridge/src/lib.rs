// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! uri-to-file — Native platform bridge abstractions.
//!
//! This crate defines the traits through which the copy pipeline talks to the
//! platform (content metadata, byte channels, app-private storage) and the
//! method-call surface the host framework drives. Android is reached over JNI;
//! every other target gets a directory-backed stub so desktop and CI builds can
//! exercise the whole pipeline.

pub mod channel;
pub mod method;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use std::sync::Arc;

/// Retrieves the bridge implementation for the target operating system.
///
/// RETURNS: a shared trait object (`dyn PlatformBridge`) so the orchestrator
/// and every copy worker can hold it at once.
pub fn platform_bridge() -> Arc<dyn traits::PlatformBridge> {
    #[cfg(target_os = "android")]
    {
        // Android: ContentResolver via `jni-rs` calls into ART.
        Arc::new(android::AndroidBridge::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no content providers exist; callers wanting a working
        // pipeline construct `stub::StubBridge::with_root` themselves.
        Arc::new(stub::StubBridge::unrooted())
    }
}
