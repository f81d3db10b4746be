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

//! Contains Rust mappings for the Parquet enums shared across modules: physical types,
//! field repetition, compression codecs and value encodings.

use std::fmt;

use crate::errors::{ParquetError, Result};

// ----------------------------------------------------------------------
// Mirrors of the Parquet format enums

/// Physical types supported by Parquet. The set is closed: every place that dispatches
/// on the physical type matches all eight variants.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
  BOOLEAN,
  INT32,
  INT64,
  INT96,
  FLOAT,
  DOUBLE,
  BYTE_ARRAY,
  FIXED_LEN_BYTE_ARRAY
}

impl Type {
  /// Returns the size in bytes of one value of this type in the byte-stream view,
  /// or `None` for types whose width is not fixed by the type alone.
  pub fn value_size(&self) -> Option<usize> {
    match *self {
      Type::BOOLEAN => Some(1),
      Type::INT32 | Type::FLOAT => Some(4),
      Type::INT64 | Type::DOUBLE => Some(8),
      Type::INT96 => Some(12),
      Type::BYTE_ARRAY | Type::FIXED_LEN_BYTE_ARRAY => None
    }
  }
}

/// Representation of field repetition: whether a field must appear exactly once,
/// at most once or any number of times in its enclosing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
  REQUIRED,
  OPTIONAL,
  REPEATED
}

/// Supported page compression codecs.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
  UNCOMPRESSED,
  SNAPPY,
  GZIP,
  LZO,
  BROTLI
}

/// Value encodings. Only `PLAIN` is produced by the file writer.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
  PLAIN,
  RLE,
  BIT_PACKED
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl fmt::Display for Repetition {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl fmt::Display for Compression {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl fmt::Display for Encoding {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

// ----------------------------------------------------------------------
// Conversions to and from the on-disk tags

impl From<Type> for u8 {
  fn from(tp: Type) -> Self {
    match tp {
      Type::BOOLEAN => 0,
      Type::INT32 => 1,
      Type::INT64 => 2,
      Type::INT96 => 3,
      Type::FLOAT => 4,
      Type::DOUBLE => 5,
      Type::BYTE_ARRAY => 6,
      Type::FIXED_LEN_BYTE_ARRAY => 7
    }
  }
}

impl TryFrom<u8> for Type {
  type Error = ParquetError;

  fn try_from(tag: u8) -> Result<Self> {
    match tag {
      0 => Ok(Type::BOOLEAN),
      1 => Ok(Type::INT32),
      2 => Ok(Type::INT64),
      3 => Ok(Type::INT96),
      4 => Ok(Type::FLOAT),
      5 => Ok(Type::DOUBLE),
      6 => Ok(Type::BYTE_ARRAY),
      7 => Ok(Type::FIXED_LEN_BYTE_ARRAY),
      _ => Err(general_err!("Invalid physical type tag {}", tag))
    }
  }
}

impl From<Repetition> for u8 {
  fn from(tp: Repetition) -> Self {
    match tp {
      Repetition::REQUIRED => 0,
      Repetition::OPTIONAL => 1,
      Repetition::REPEATED => 2
    }
  }
}

impl TryFrom<u8> for Repetition {
  type Error = ParquetError;

  fn try_from(tag: u8) -> Result<Self> {
    match tag {
      0 => Ok(Repetition::REQUIRED),
      1 => Ok(Repetition::OPTIONAL),
      2 => Ok(Repetition::REPEATED),
      _ => Err(general_err!("Invalid repetition tag {}", tag))
    }
  }
}

impl From<Compression> for u8 {
  fn from(tp: Compression) -> Self {
    match tp {
      Compression::UNCOMPRESSED => 0,
      Compression::SNAPPY => 1,
      Compression::GZIP => 2,
      Compression::LZO => 3,
      Compression::BROTLI => 4
    }
  }
}

impl TryFrom<u8> for Compression {
  type Error = ParquetError;

  fn try_from(tag: u8) -> Result<Self> {
    match tag {
      0 => Ok(Compression::UNCOMPRESSED),
      1 => Ok(Compression::SNAPPY),
      2 => Ok(Compression::GZIP),
      3 => Ok(Compression::LZO),
      4 => Ok(Compression::BROTLI),
      _ => Err(general_err!("Invalid compression tag {}", tag))
    }
  }
}

impl From<Encoding> for u8 {
  fn from(tp: Encoding) -> Self {
    match tp {
      Encoding::PLAIN => 0,
      Encoding::RLE => 3,
      Encoding::BIT_PACKED => 4
    }
  }
}

impl TryFrom<u8> for Encoding {
  type Error = ParquetError;

  fn try_from(tag: u8) -> Result<Self> {
    match tag {
      0 => Ok(Encoding::PLAIN),
      3 => Ok(Encoding::RLE),
      4 => Ok(Encoding::BIT_PACKED),
      _ => Err(general_err!("Invalid encoding tag {}", tag))
    }
  }
}
