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

//! Data types that connect Parquet physical types with their Rust-specific
//! representations.

use std::fmt;

use crate::basic::Type;
use crate::column::page::ValueBuffer;
use crate::value::ValueKind;

/// Rust representation for the legacy INT96 physical type, backed by three `u32`
/// little-endian words. Serialized form takes exactly 12 bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Int96 {
  value: [u32; 3]
}

impl Int96 {
  /// Creates new INT96 value from its three words, least significant first.
  pub fn new(elem0: u32, elem1: u32, elem2: u32) -> Self {
    Self { value: [elem0, elem1, elem2] }
  }

  /// Returns underlying data as slice of [`u32`].
  pub fn data(&self) -> &[u32] {
    &self.value
  }

  /// Sets data for this INT96 type.
  pub fn set_data(&mut self, elem0: u32, elem1: u32, elem2: u32) {
    self.value = [elem0, elem1, elem2];
  }

  /// Returns the 12-byte little-endian representation of this value.
  pub fn to_bytes(&self) -> [u8; 12] {
    let mut bytes = [0; 12];
    for (i, word) in self.value.iter().enumerate() {
      bytes[i * 4..(i + 1) * 4].copy_from_slice(&word.to_le_bytes());
    }
    bytes
  }

  /// Builds a value from its 12-byte little-endian representation.
  pub fn from_bytes(bytes: &[u8; 12]) -> Self {
    let mut value = [0u32; 3];
    for (i, word) in value.iter_mut().enumerate() {
      let mut buf = [0; 4];
      buf.copy_from_slice(&bytes[i * 4..(i + 1) * 4]);
      *word = u32::from_le_bytes(buf);
    }
    Self { value }
  }
}

impl From<Vec<u32>> for Int96 {
  fn from(buf: Vec<u32>) -> Self {
    assert_eq!(buf.len(), 3);
    Self::new(buf[0], buf[1], buf[2])
  }
}

impl fmt::Display for Int96 {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self.value)
  }
}

/// Rust representation for BYTE_ARRAY and FIXED_LEN_BYTE_ARRAY Parquet physical types.
/// Value is backed by an owned byte vector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ByteArray {
  data: Vec<u8>
}

impl ByteArray {
  /// Creates new empty byte array.
  pub fn new() -> Self {
    ByteArray { data: vec![] }
  }

  /// Gets length of the underlying byte buffer.
  pub fn len(&self) -> usize {
    self.data.len()
  }

  /// Returns `true` if this byte array holds no bytes.
  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Returns slice of data.
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// Sets data for this byte array.
  pub fn set_data(&mut self, data: Vec<u8>) {
    self.data = data;
  }

  /// Returns the data as a UTF-8 string slice, if it is valid UTF-8.
  pub fn as_utf8(&self) -> Option<&str> {
    ::std::str::from_utf8(&self.data).ok()
  }
}

impl From<Vec<u8>> for ByteArray {
  fn from(buf: Vec<u8>) -> ByteArray {
    Self { data: buf }
  }
}

impl<'a> From<&'a [u8]> for ByteArray {
  fn from(buf: &'a [u8]) -> ByteArray {
    Self { data: buf.to_vec() }
  }
}

impl<'a> From<&'a str> for ByteArray {
  fn from(s: &'a str) -> ByteArray {
    Self { data: s.as_bytes().to_vec() }
  }
}

impl From<String> for ByteArray {
  fn from(s: String) -> ByteArray {
    Self { data: s.into_bytes() }
  }
}

/// Contains the Parquet physical type information as well as the Rust primitive type
/// presentation, and how values of the type are kept in a [`ValueBuffer`].
pub trait DataType: 'static {
  type T: PartialEq + fmt::Debug + Default + Clone;

  /// Returns Parquet physical type.
  fn get_physical_type() -> Type;

  /// Returns size in bytes for Rust representation of the physical type.
  fn get_type_size() -> usize;

  /// Returns the values held by `buffer`, or `None` if the buffer is of another type.
  fn get_values(buffer: &ValueBuffer) -> Option<&[Self::T]>;

  /// Returns the growable values held by `buffer`, or `None` if the buffer is of
  /// another type.
  fn get_values_mut(buffer: &mut ValueBuffer) -> Option<&mut Vec<Self::T>>;

  /// Wraps a native value into a value payload.
  fn to_value_kind(value: Self::T) -> ValueKind;
}

macro_rules! make_type {
  ($name:ident, $physical_ty:path, $native_ty:ty, $variant:ident) => {
    pub struct $name {}

    impl DataType for $name {
      type T = $native_ty;

      fn get_physical_type() -> Type {
        $physical_ty
      }

      fn get_type_size() -> usize {
        ::std::mem::size_of::<$native_ty>()
      }

      fn get_values(buffer: &ValueBuffer) -> Option<&[Self::T]> {
        match *buffer {
          ValueBuffer::$variant(ref values) => Some(values),
          _ => None
        }
      }

      fn get_values_mut(buffer: &mut ValueBuffer) -> Option<&mut Vec<Self::T>> {
        match *buffer {
          ValueBuffer::$variant(ref mut values) => Some(values),
          _ => None
        }
      }

      fn to_value_kind(value: Self::T) -> ValueKind {
        ValueKind::$variant(value)
      }
    }
  };
}

// Generate struct definitions for all physical types

make_type!(BoolType, Type::BOOLEAN, bool, Boolean);
make_type!(Int32Type, Type::INT32, i32, Int32);
make_type!(Int64Type, Type::INT64, i64, Int64);
make_type!(Int96Type, Type::INT96, Int96, Int96);
make_type!(FloatType, Type::FLOAT, f32, Float);
make_type!(DoubleType, Type::DOUBLE, f64, Double);
make_type!(ByteArrayType, Type::BYTE_ARRAY, ByteArray, ByteArray);
make_type!(FixedLenByteArrayType, Type::FIXED_LEN_BYTE_ARRAY, ByteArray, FixedLenByteArray);


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_int96_from() {
    assert_eq!(
      Int96::from(vec![1, 12345, 1234567890]).data(),
      &[1, 12345, 1234567890]
    );
  }

  #[test]
  fn test_int96_bytes() {
    let i96 = Int96::new(1, 2, 3);
    let bytes = i96.to_bytes();
    assert_eq!(bytes, [1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
    assert_eq!(Int96::from_bytes(&bytes), i96);
  }

  #[test]
  fn test_byte_array_from() {
    assert_eq!(ByteArray::from(vec![b'A', b'B', b'C']).data(), &[b'A', b'B', b'C']);
    assert_eq!(ByteArray::from("ABC").data(), &[b'A', b'B', b'C']);
    assert_eq!(ByteArray::from(&[1u8, 2, 3][..]).len(), 3);
    assert_eq!(ByteArray::from(String::from("xyz")).as_utf8(), Some("xyz"));
    assert!(ByteArray::new().is_empty());
  }

  #[test]
  fn test_physical_types() {
    assert_eq!(BoolType::get_physical_type(), Type::BOOLEAN);
    assert_eq!(Int32Type::get_physical_type(), Type::INT32);
    assert_eq!(Int64Type::get_physical_type(), Type::INT64);
    assert_eq!(Int96Type::get_physical_type(), Type::INT96);
    assert_eq!(FloatType::get_physical_type(), Type::FLOAT);
    assert_eq!(DoubleType::get_physical_type(), Type::DOUBLE);
    assert_eq!(ByteArrayType::get_physical_type(), Type::BYTE_ARRAY);
    assert_eq!(FixedLenByteArrayType::get_physical_type(), Type::FIXED_LEN_BYTE_ARRAY);
    assert_eq!(Int32Type::get_type_size(), 4);
    assert_eq!(Int96Type::get_type_size(), 12);
  }

  #[test]
  fn test_buffer_access() {
    let mut buffer = ValueBuffer::new(Type::INT32);
    Int32Type::get_values_mut(&mut buffer).unwrap().push(7);
    assert_eq!(Int32Type::get_values(&buffer), Some(&[7][..]));
    assert!(Int64Type::get_values(&buffer).is_none());
    assert!(ByteArrayType::get_values_mut(&mut buffer).is_none());
  }
}
