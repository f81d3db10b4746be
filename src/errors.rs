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

//! Common Parquet errors and macros.

use std::io;
use std::result;

quick_error! {
  /// Set of errors that can be produced while shredding, buffering, writing or reading
  /// column data.
  #[derive(Debug)]
  pub enum ParquetError {
    /// General structural error: unknown column index, row that does not cover every
    /// leaf column, type mismatch between a typed access and the column's physical type,
    /// or misuse of a closed writer.
    General(message: String) {
      display("Parquet error: {}", message)
    }
    /// Invalid schema definition.
    Schema(message: String) {
      display("Schema error: {}", message)
    }
    /// "Not yet implemented" error, e.g. an unsupported compression codec.
    NYI(message: String) {
      display("NYI: {}", message)
    }
    /// End of data. Not a fault: signals exhaustion of a value stream, page iterator
    /// or row reader, and is reported again on every subsequent call.
    EOF(message: String) {
      display("EOF: {}", message)
    }
    /// Underlying I/O failure.
    Io(err: io::Error) {
      from()
      display("IO error: {}", err)
      source(err)
    }
  }
}

impl ParquetError {
  /// Returns `true` if this error only signals end of data.
  pub fn is_eof(&self) -> bool {
    match *self {
      ParquetError::EOF(_) => true,
      _ => false
    }
  }
}

/// A specialized `Result` for Parquet errors.
pub type Result<T> = result::Result<T, ParquetError>;

impl From<ParquetError> for io::Error {
  fn from(e: ParquetError) -> Self {
    match e {
      ParquetError::Io(err) => err,
      ParquetError::EOF(msg) => io::Error::new(io::ErrorKind::UnexpectedEof, msg),
      other => io::Error::new(io::ErrorKind::InvalidData, other.to_string())
    }
  }
}

// ----------------------------------------------------------------------
// Convenient macros for different errors

macro_rules! general_err {
  ($fmt:expr) => (ParquetError::General($fmt.to_owned()));
  ($fmt:expr, $($args:expr),*) => (ParquetError::General(format!($fmt, $($args),*)));
}

macro_rules! schema_err {
  ($fmt:expr) => (ParquetError::Schema($fmt.to_owned()));
  ($fmt:expr, $($args:expr),*) => (ParquetError::Schema(format!($fmt, $($args),*)));
}

macro_rules! nyi_err {
  ($fmt:expr) => (ParquetError::NYI($fmt.to_owned()));
  ($fmt:expr, $($args:expr),*) => (ParquetError::NYI(format!($fmt, $($args),*)));
}

macro_rules! eof_err {
  ($fmt:expr) => (ParquetError::EOF($fmt.to_owned()));
  ($fmt:expr, $($args:expr),*) => (ParquetError::EOF(format!($fmt, $($args),*)));
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_is_eof() {
    assert!(eof_err!("no more values").is_eof());
    assert!(!general_err!("column {} is unknown", 3).is_eof());
    assert!(!ParquetError::from(io::Error::new(io::ErrorKind::Other, "x")).is_eof());
  }

  #[test]
  fn test_error_display() {
    assert_eq!(general_err!("bad row").to_string(), "Parquet error: bad row");
    assert_eq!(eof_err!("page {}", 1).to_string(), "EOF: page 1");
    assert_eq!(schema_err!("bad").to_string(), "Schema error: bad");
    assert_eq!(nyi_err!("codec {}", "LZO").to_string(), "NYI: codec LZO");
  }

  #[test]
  fn test_into_io_error() {
    let err: io::Error = eof_err!("done").into();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    let err: io::Error = general_err!("mismatch").into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
  }
}
