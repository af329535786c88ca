// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Every trait method goes through the hosting
// Activity's `ContentResolver`.
//
// ## Threading
//
// Copy workers call into this bridge from their own threads. Each call
// attaches the current thread to the VM permanently, so a pool thread pays
// the attach cost once. Since those threads never return to Java, every call
// runs inside its own local frame and leaves no local references behind.

#![cfg(target_os = "android")]

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::FromRawFd;
use std::path::PathBuf;
use std::sync::OnceLock;

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

use uri_to_file_core::SourceReference;
use uri_to_file_core::error::{Result, UriToFileError};

use crate::channel::ReaderChannel;
use crate::traits::*;

/// `OpenableColumns.DISPLAY_NAME`.
const COLUMN_DISPLAY_NAME: &str = "_display_name";

/// `MediaStore.MediaColumns.DATA`, deprecated but still populated by some
/// providers.
const COLUMN_DATA: &str = "_data";

const SIG_QUERY: &str = "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;";

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

/// The process-wide `JavaVM`, read from `ndk_context` on first use.
fn java_vm() -> Result<&'static JavaVM> {
    if let Some(vm) = JAVA_VM.get() {
        return Ok(vm);
    }
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| UriToFileError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    Ok(JAVA_VM.get_or_init(|| vm))
}

/// Obtain a [`JNIEnv`] for the current thread.
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| UriToFileError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Run `f` inside a JNI local frame so every local reference it creates is
/// freed on return. Pool threads stay attached for good and never return to
/// Java, so nothing else would ever release them.
fn with_local_frame<T>(capacity: i32, f: impl FnOnce(&mut JNIEnv) -> Result<T>) -> Result<T> {
    let mut env = jni_env()?;
    leave_frame(env.with_local_frame(capacity, |env| f(env).map_err(FrameError::Call)))
}

fn leave_frame<T>(result: std::result::Result<T, FrameError>) -> Result<T> {
    result.map_err(|e| match e {
        FrameError::Call(e) => e,
        FrameError::Jni(e) => UriToFileError::Bridge(format!("local frame: {e}")),
    })
}

/// Error carried out of a local frame.
enum FrameError {
    Call(UriToFileError),
    Jni(jni::errors::Error),
}

impl From<jni::errors::Error> for FrameError {
    fn from(e: jni::errors::Error) -> Self {
        FrameError::Jni(e)
    }
}

/// Local references a single bridge call may hold at once.
const FRAME_CAPACITY: i32 = 16;

/// The hosting `Context` (normally the Activity).
fn context() -> Result<JObject<'static>> {
    let ptr = ndk_context::android_context().context();
    if ptr.is_null() {
        return Err(UriToFileError::Bridge(
            "Android context is null; native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Context.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Map a JNI failure into `UriToFileError::Bridge`, clearing any pending Java
/// exception so the env stays usable.
fn jni_err(env: &mut JNIEnv, context: &str, e: jni::errors::Error) -> UriToFileError {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    UriToFileError::Bridge(format!("{context}: {e}"))
}

fn content_resolver<'local>(env: &mut JNIEnv<'local>) -> Result<JObject<'local>> {
    let ctx = context()?;
    let resolver = env
        .call_method(
            &ctx,
            "getContentResolver",
            "()Landroid/content/ContentResolver;",
            &[],
        )
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "getContentResolver", e))?;
    Ok(resolver)
}

fn parse_uri<'local>(env: &mut JNIEnv<'local>, uri: &SourceReference) -> Result<JObject<'local>> {
    let j_uri_str = env
        .new_string(uri.as_str())
        .map_err(|e| jni_err(env, "new_string(uri)", e))?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_uri_str)],
    )
    .and_then(|v| v.l())
    .map_err(|e| jni_err(env, "Uri.parse", e))
}

fn java_string(env: &mut JNIEnv, obj: JObject) -> Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let j_str = JString::from(obj);
    let value: String = env
        .get_string(&j_str)
        .map_err(|e| jni_err(env, "get_string", e))?
        .into();
    Ok(Some(value))
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the uri-to-file platform bridge.
///
/// Zero-sized; all state lives on the Java side.
pub struct AndroidBridge;

impl AndroidBridge {
    /// Create a new Android bridge.
    ///
    /// This does **not** touch JNI. The first JNI call happens lazily when
    /// a trait method is invoked.
    pub fn new() -> Self {
        Self
    }

    /// `resolver.query(uri, projection, null, null, null)` and read `column`
    /// from the first row. The cursor is closed on every path.
    fn query_first_string(
        &self,
        uri: &SourceReference,
        projection: Option<&str>,
        column: &str,
    ) -> Result<Option<String>> {
        with_local_frame(FRAME_CAPACITY, |env| {
            let resolver = content_resolver(env)?;
            let uri_obj = parse_uri(env, uri)?;

            let projection_arr: JObject = match projection {
                Some(col) => {
                    let arr = env
                        .new_object_array(1, "java/lang/String", JObject::null())
                        .map_err(|e| jni_err(env, "new_object_array", e))?;
                    let j_col = env
                        .new_string(col)
                        .map_err(|e| jni_err(env, "new_string(column)", e))?;
                    env.set_object_array_element(&arr, 0, j_col)
                        .map_err(|e| jni_err(env, "set_object_array_element", e))?;
                    arr.into()
                }
                None => JObject::null(),
            };

            let null = JObject::null();
            let cursor = env
                .call_method(
                    &resolver,
                    "query",
                    SIG_QUERY,
                    &[
                        JValue::Object(&uri_obj),
                        JValue::Object(&projection_arr),
                        JValue::Object(&null),
                        JValue::Object(&null),
                        JValue::Object(&null),
                    ],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "ContentResolver.query", e))?;

            if cursor.is_null() {
                return Ok(None);
            }

            let value = read_first_row(env, &cursor, column);

            if let Err(e) = env.call_method(&cursor, "close", "()V", &[]) {
                let err = jni_err(env, "Cursor.close", e);
                tracing::warn!(error = %err, "failed to close cursor");
            }
            value
        })
    }
}

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn read_first_row(env: &mut JNIEnv, cursor: &JObject, column: &str) -> Result<Option<String>> {
    let has_row = env
        .call_method(cursor, "moveToFirst", "()Z", &[])
        .and_then(|v| v.z())
        .map_err(|e| jni_err(env, "Cursor.moveToFirst", e))?;
    if !has_row {
        return Ok(None);
    }

    let j_col = env
        .new_string(column)
        .map_err(|e| jni_err(env, "new_string(column)", e))?;
    let index = env
        .call_method(
            cursor,
            "getColumnIndex",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&j_col)],
        )
        .and_then(|v| v.i())
        .map_err(|e| jni_err(env, "Cursor.getColumnIndex", e))?;
    if index < 0 {
        return Ok(None);
    }

    let value = env
        .call_method(
            cursor,
            "getString",
            "(I)Ljava/lang/String;",
            &[JValue::Int(index)],
        )
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "Cursor.getString", e))?;
    java_string(env, value)
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// ContentQuery — ContentResolver.query
// ---------------------------------------------------------------------------

impl ContentQuery for AndroidBridge {
    fn query_display_name(&self, uri: &SourceReference) -> Result<Option<String>> {
        self.query_first_string(uri, None, COLUMN_DISPLAY_NAME)
    }

    fn query_data_column(&self, uri: &SourceReference) -> Result<Option<String>> {
        self.query_first_string(uri, Some(COLUMN_DATA), COLUMN_DATA)
    }
}

// ---------------------------------------------------------------------------
// ContentStreams — AssetFileDescriptor / OutputStream
// ---------------------------------------------------------------------------

impl ContentStreams for AndroidBridge {
    /// Opens `openAssetFileDescriptor(uri, "r")`, detaches its raw fd and
    /// hands it to Rust as a `File` positioned at the asset's start offset.
    fn open_asset(&self, uri: &SourceReference) -> Result<AssetDescriptor> {
        let (fd, start, length) = with_local_frame(FRAME_CAPACITY, |env| {
            let resolver = content_resolver(env)?;
            let uri_obj = parse_uri(env, uri)?;
            let mode = env
                .new_string("r")
                .map_err(|e| jni_err(env, "new_string(mode)", e))?;

            let afd = env
                .call_method(
                    &resolver,
                    "openAssetFileDescriptor",
                    "(Landroid/net/Uri;Ljava/lang/String;)Landroid/content/res/AssetFileDescriptor;",
                    &[JValue::Object(&uri_obj), JValue::Object(&mode)],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "openAssetFileDescriptor", e))?;
            if afd.is_null() {
                return Err(UriToFileError::ContentUnavailable(format!(
                    "provider returned no descriptor for {uri}"
                )));
            }

            let length = env
                .call_method(&afd, "getLength", "()J", &[])
                .and_then(|v| v.j())
                .map_err(|e| jni_err(env, "AssetFileDescriptor.getLength", e))?;
            let start = env
                .call_method(&afd, "getStartOffset", "()J", &[])
                .and_then(|v| v.j())
                .map_err(|e| jni_err(env, "AssetFileDescriptor.getStartOffset", e))?;
            let pfd = env
                .call_method(
                    &afd,
                    "getParcelFileDescriptor",
                    "()Landroid/os/ParcelFileDescriptor;",
                    &[],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "getParcelFileDescriptor", e))?;
            let fd = env
                .call_method(&pfd, "detachFd", "()I", &[])
                .and_then(|v| v.i())
                .map_err(|e| jni_err(env, "ParcelFileDescriptor.detachFd", e))?;

            // The fd is ours now; closing the descriptor only releases the
            // Java wrapper.
            if let Err(e) = env.call_method(&afd, "close", "()V", &[]) {
                let err = jni_err(env, "AssetFileDescriptor.close", e);
                tracing::debug!(error = %err, "descriptor close after detach failed");
            }
            Ok((fd, start, length))
        })?;

        // SAFETY: `detachFd` transferred ownership of a valid open fd to us.
        let mut file = unsafe { File::from_raw_fd(fd) };
        let start = u64::try_from(start).unwrap_or(0);
        file.seek(SeekFrom::Start(start))?;

        let declared = u64::try_from(length).ok();
        let size = match declared {
            Some(len) => len,
            None => file.metadata()?.len().saturating_sub(start),
        };

        tracing::debug!(uri = %uri, size, declared = ?declared, "Android: asset opened");
        let channel = ReaderChannel::new(file.take(size), size);
        Ok(AssetDescriptor::new(Box::new(channel), declared))
    }

    fn open_output(&self, uri: &SourceReference) -> Result<Box<dyn Write + Send>> {
        let stream = with_local_frame(FRAME_CAPACITY, |env| {
            let resolver = content_resolver(env)?;
            let uri_obj = parse_uri(env, uri)?;

            let stream = env
                .call_method(
                    &resolver,
                    "openOutputStream",
                    "(Landroid/net/Uri;)Ljava/io/OutputStream;",
                    &[JValue::Object(&uri_obj)],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "openOutputStream", e))?;
            if stream.is_null() {
                return Err(UriToFileError::ContentUnavailable(format!(
                    "provider returned no output stream for {uri}"
                )));
            }
            // Global refs outlive the frame.
            env.new_global_ref(stream)
                .map_err(|e| jni_err(env, "new_global_ref(OutputStream)", e))
        })?;
        Ok(Box::new(JavaOutputStream { stream }))
    }
}

// ---------------------------------------------------------------------------
// AppStorage — Context.getFilesDir
// ---------------------------------------------------------------------------

impl AppStorage for AndroidBridge {
    fn files_dir(&self) -> Result<PathBuf> {
        with_local_frame(FRAME_CAPACITY, |env| {
            let ctx = context()?;
            let dir = env
                .call_method(&ctx, "getFilesDir", "()Ljava/io/File;", &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "getFilesDir", e))?;
            let path = env
                .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "File.getAbsolutePath", e))?;
            java_string(env, path)?
                .map(PathBuf::from)
                .ok_or_else(|| UriToFileError::Bridge("getFilesDir returned null".into()))
        })
    }
}

// ---------------------------------------------------------------------------
// java.io.OutputStream as std::io::Write
// ---------------------------------------------------------------------------

struct JavaOutputStream {
    stream: GlobalRef,
}

fn to_io(err: UriToFileError) -> io::Error {
    io::Error::other(err)
}

impl Write for JavaOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut env = jni_env().map_err(to_io)?;
        let len = buf.len().min(i32::MAX as usize);
        let array = env
            .byte_array_from_slice(&buf[..len])
            .map_err(|e| to_io(jni_err(&mut env, "byte_array_from_slice", e)))?;
        env.call_method(
            &self.stream,
            "write",
            "([BII)V",
            &[JValue::Object(&array), JValue::Int(0), JValue::Int(len as i32)],
        )
        .map_err(|e| to_io(jni_err(&mut env, "OutputStream.write", e)))?;
        let _ = env.delete_local_ref(array);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut env = jni_env().map_err(to_io)?;
        env.call_method(&self.stream, "flush", "()V", &[])
            .map_err(|e| to_io(jni_err(&mut env, "OutputStream.flush", e)))?;
        Ok(())
    }
}

impl Drop for JavaOutputStream {
    fn drop(&mut self) {
        let Ok(mut env) = jni_env() else {
            return;
        };
        if let Err(e) = env.call_method(&self.stream, "close", "()V", &[]) {
            let err = jni_err(&mut env, "OutputStream.close", e);
            tracing::warn!(error = %err, "failed to close output stream");
        }
    }
}
