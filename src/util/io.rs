// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::cmp;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

/// Shared handle to a seekable source, read at independent positions by several
/// [`FileChunk`]s.
pub type SharedSource<R> = Arc<Mutex<R>>;

/// Struct that represents a slice of a source with independent start position and
/// length. The source is shared, so its position is reset before every read.
pub struct FileChunk<R: Read + Seek> {
  reader: SharedSource<R>,
  start: u64, // start position in the source
  end: u64 // end position in the source
}

impl<R: Read + Seek> FileChunk<R> {
  /// Creates new chunk reader with start and length from a shared source.
  pub fn new(reader: SharedSource<R>, start: u64, length: u64) -> Self {
    Self { reader, start, end: start + length }
  }

  /// Number of bytes left in this chunk.
  pub fn remaining(&self) -> u64 {
    self.end - self.start
  }
}

impl<R: Read + Seek> Read for FileChunk<R> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let bytes_to_read = cmp::min(buf.len() as u64, self.end - self.start) as usize;
    if bytes_to_read == 0 {
      return Ok(0);
    }
    let mut reader = self
      .reader
      .lock()
      .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
    reader.seek(SeekFrom::Start(self.start))?;
    let bytes_read = reader.read(&mut buf[..bytes_to_read])?;
    self.start += bytes_read as u64;
    Ok(bytes_read)
  }
}

/// Wraps a sink and counts the bytes written through it, which gives the offset of
/// the next write relative to where the sink was when wrapped.
pub struct TrackedWrite<W: Write> {
  inner: W,
  bytes_written: u64
}

impl<W: Write> TrackedWrite<W> {
  pub fn new(inner: W) -> Self {
    Self { inner, bytes_written: 0 }
  }

  /// Number of bytes written so far.
  pub fn bytes_written(&self) -> u64 {
    self.bytes_written
  }

  pub fn into_inner(self) -> W {
    self.inner
  }
}

impl<W: Write> Write for TrackedWrite<W> {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let n = self.inner.write(buf)?;
    self.bytes_written += n as u64;
    Ok(n)
  }

  fn flush(&mut self) -> io::Result<()> {
    self.inner.flush()
  }
}
