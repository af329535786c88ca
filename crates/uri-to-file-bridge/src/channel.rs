// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `SourceChannel` over any blocking reader.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::traits::SourceChannel;

/// Chunk size for a single `transfer_to` call.
pub const TRANSFER_CHUNK: usize = 64 * 1024;

/// Adapts a sequential reader with a known size into a [`SourceChannel`].
///
/// One `transfer_to` call performs at most one `read`, so transfers are
/// naturally partial and the caller's loop decides when the copy is done.
pub struct ReaderChannel<R> {
    reader: R,
    size: u64,
    buf: Vec<u8>,
}

impl<R: Read + Send> ReaderChannel<R> {
    pub fn new(reader: R, size: u64) -> Self {
        Self {
            reader,
            size,
            buf: vec![0; TRANSFER_CHUNK],
        }
    }
}

impl ReaderChannel<File> {
    /// Channel over a whole file; the size comes from its metadata.
    pub fn from_file(file: File) -> io::Result<Self> {
        let size = file.metadata()?.len();
        Ok(Self::new(file, size))
    }
}

impl<R: Read + Send> SourceChannel for ReaderChannel<R> {
    fn size(&self) -> io::Result<u64> {
        Ok(self.size)
    }

    fn transfer_to(&mut self, dest: &mut File, position: u64, count: u64) -> io::Result<u64> {
        let want = count.min(self.buf.len() as u64) as usize;
        if want == 0 {
            return Ok(0);
        }

        let read = loop {
            match self.reader.read(&mut self.buf[..want]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if read == 0 {
            return Ok(0);
        }

        dest.seek(SeekFrom::Start(position))?;
        dest.write_all(&self.buf[..read])?;
        Ok(read as u64)
    }
}
