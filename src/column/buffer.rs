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

//! Contains `ColumnBuffer`, the growable in-memory builder of one column's page.

use std::io;
use std::mem;

use crate::basic::Type;
use crate::data_type::*;
use crate::errors::{ParquetError, Result};
use crate::schema::types::ColumnDescPtr;
use crate::value::{Value, ValueKind};

use super::page::{Page, BYTE_ARRAY_LENGTH_SIZE};

/// Append-only buffer of the values of one column.
///
/// Every row written contributes at least one slot, so the number of rows in the
/// buffer is always the number of rows written, whether or not they carried a value
/// for this column. Values can be written per row, as typed batches, or as a byte
/// stream through [`io::Write`]; the last two append one defined value per row.
///
/// [`ColumnBuffer::page`] exposes the buffered values as a [`Page`] borrowed from the
/// buffer, so it cannot outlive the next mutation.
pub struct ColumnBuffer {
  page: Page,
  // bytes of an incomplete value received through the byte-stream view
  pending: Vec<u8>
}

impl ColumnBuffer {
  pub fn new(descr: ColumnDescPtr) -> Self {
    Self { page: Page::empty(descr), pending: vec![] }
  }

  pub fn column_descr(&self) -> &ColumnDescPtr {
    &self.page.descr
  }

  pub fn column_index(&self) -> u16 {
    self.page.column_index()
  }

  /// Returns a read-only view of the values written so far.
  pub fn page(&self) -> &Page {
    &self.page
  }

  pub fn num_rows(&self) -> usize {
    self.page.num_rows()
  }

  pub fn num_values(&self) -> usize {
    self.page.num_values()
  }

  /// Removes every buffered value, keeping the column.
  pub fn reset(&mut self) {
    self.page.values.clear();
    self.page.def_levels.clear();
    self.page.rep_levels.clear();
    self.page.num_rows = 0;
    self.pending.clear();
  }

  /// Checks that `values` form exactly one row of this column: every value belongs to
  /// the column, the first one starts a row, the following ones continue it, and levels
  /// and payloads are consistent with the column type.
  pub fn check_row(&self, values: &[Value]) -> Result<()> {
    let descr = &self.page.descr;
    if values.is_empty() {
      return Err(general_err!("Row has no value for column '{}'", descr.path()));
    }
    let max_def_level = descr.max_def_level();
    let max_rep_level = descr.max_rep_level();
    if max_rep_level == 0 && values.len() > 1 {
      return Err(general_err!(
        "Row has {} values for non-repeated column '{}'", values.len(), descr.path()
      ));
    }
    for (i, value) in values.iter().enumerate() {
      if value.column_index() != descr.column_index() {
        return Err(general_err!(
          "Value of column {} written to column {}", value.column_index(), descr.column_index()
        ));
      }
      let rep = value.repetition_level();
      if (i == 0 && rep != 0) || (i > 0 && rep == 0) || rep > max_rep_level {
        return Err(general_err!(
          "Invalid repetition level {} at position {} of column '{}'", rep, i, descr.path()
        ));
      }
      let def = value.definition_level();
      if def > max_def_level {
        return Err(general_err!(
          "Definition level {} above maximum {} for column '{}'", def, max_def_level, descr.path()
        ));
      }
      match value.physical_type() {
        None if def == max_def_level => {
          return Err(general_err!(
            "Null value at definition level {} in column '{}'", def, descr.path()
          ));
        },
        None => {},
        Some(_) if def < max_def_level => {
          return Err(general_err!(
            "Value at definition level {} below maximum in column '{}'", def, descr.path()
          ));
        },
        Some(physical_type) if physical_type != descr.physical_type() => {
          return Err(general_err!(
            "Cannot write {} value to column '{}' of type {}",
            physical_type, descr.path(), descr.physical_type()
          ));
        },
        Some(_) => self.check_kind(value.kind())?
      }
    }
    Ok(())
  }

  fn check_kind(&self, kind: &ValueKind) -> Result<()> {
    if let ValueKind::FixedLenByteArray(ref v) = *kind {
      self.check_type_length(v)?;
    }
    Ok(())
  }

  fn check_type_length(&self, value: &ByteArray) -> Result<()> {
    let type_length = self.page.descr.type_length() as usize;
    if value.len() != type_length {
      return Err(general_err!(
        "Expected {} bytes for column '{}', got {}", type_length, self.page.descr.path(), value.len()
      ));
    }
    Ok(())
  }

  /// Appends one row of this column. Nothing is written if the row is invalid.
  pub fn write_row(&mut self, values: &[Value]) -> Result<()> {
    self.check_row(values)?;
    self.append_row(values)
  }

  /// Appends a row already validated with [`ColumnBuffer::check_row`].
  pub(crate) fn append_row(&mut self, values: &[Value]) -> Result<()> {
    let max_def_level = self.page.descr.max_def_level();
    let max_rep_level = self.page.descr.max_rep_level();
    for value in values {
      if !value.is_null() {
        self.page.values.push(value.kind().clone())?;
      }
      if max_def_level > 0 {
        self.page.def_levels.push(value.definition_level());
      }
      if max_rep_level > 0 {
        self.page.rep_levels.push(value.repetition_level());
      }
    }
    self.page.num_rows += 1;
    Ok(())
  }

  /// Appends `n` defined values as `n` rows, once their payloads are in the buffer.
  fn append_defined_levels(&mut self, n: usize) {
    let max_def_level = self.page.descr.max_def_level();
    if max_def_level > 0 {
      self.page.def_levels.extend(std::iter::repeat(max_def_level).take(n));
    }
    if self.page.descr.max_rep_level() > 0 {
      self.page.rep_levels.extend(std::iter::repeat(0).take(n));
    }
    self.page.num_rows += n;
  }

  /// Writes values of data type `T`, one row each. Returns the number written.
  pub fn write_batch<T: DataType>(&mut self, values: &[T::T]) -> Result<usize> {
    let column_type = self.page.descr.physical_type();
    if T::get_physical_type() == Type::FIXED_LEN_BYTE_ARRAY {
      for value in values {
        self.check_kind(&T::to_value_kind(value.clone()))?;
      }
    }
    let dst = T::get_values_mut(&mut self.page.values).ok_or_else(|| {
      general_err!("Cannot write {} values to column of type {}", T::get_physical_type(), column_type)
    })?;
    dst.extend_from_slice(values);
    self.append_defined_levels(values.len());
    Ok(values.len())
  }

  pub fn write_booleans(&mut self, values: &[bool]) -> Result<usize> {
    self.write_batch::<BoolType>(values)
  }

  pub fn write_int32s(&mut self, values: &[i32]) -> Result<usize> {
    self.write_batch::<Int32Type>(values)
  }

  pub fn write_int64s(&mut self, values: &[i64]) -> Result<usize> {
    self.write_batch::<Int64Type>(values)
  }

  pub fn write_int96s(&mut self, values: &[Int96]) -> Result<usize> {
    self.write_batch::<Int96Type>(values)
  }

  pub fn write_floats(&mut self, values: &[f32]) -> Result<usize> {
    self.write_batch::<FloatType>(values)
  }

  pub fn write_doubles(&mut self, values: &[f64]) -> Result<usize> {
    self.write_batch::<DoubleType>(values)
  }

  pub fn write_byte_arrays(&mut self, values: &[ByteArray]) -> Result<usize> {
    self.write_batch::<ByteArrayType>(values)
  }

  /// Writes fixed-length byte arrays packed back to back in `data`. Only whole elements
  /// are written; returns their number.
  pub fn write_fixed_len_byte_arrays(&mut self, data: &[u8]) -> Result<usize> {
    if self.page.descr.physical_type() != Type::FIXED_LEN_BYTE_ARRAY {
      return Err(general_err!(
        "Cannot write FIXED_LEN_BYTE_ARRAY values to column of type {}",
        self.page.descr.physical_type()
      ));
    }
    let type_length = self.page.descr.type_length() as usize;
    let values: Vec<ByteArray> =
      data.chunks_exact(type_length).map(ByteArray::from).collect();
    self.write_batch::<FixedLenByteArrayType>(&values)
  }

  /// Decodes the first value of `bytes` in the byte-stream format of this column.
  /// Returns `None` if `bytes` holds no complete value.
  fn decode_value(&self, bytes: &[u8]) -> Result<Option<(ValueKind, usize)>> {
    let physical_type = self.page.descr.physical_type();
    let size = match physical_type {
      Type::BYTE_ARRAY => {
        if bytes.len() < BYTE_ARRAY_LENGTH_SIZE {
          return Ok(None);
        }
        BYTE_ARRAY_LENGTH_SIZE + read_u32(bytes) as usize
      },
      Type::FIXED_LEN_BYTE_ARRAY => self.page.descr.type_length() as usize,
      _ => physical_type.value_size().unwrap_or(0)
    };
    if bytes.len() < size {
      return Ok(None);
    }
    let kind = match physical_type {
      Type::BOOLEAN => match bytes[0] {
        0 => ValueKind::Boolean(false),
        1 => ValueKind::Boolean(true),
        b => return Err(general_err!("Invalid boolean byte {}", b))
      },
      Type::INT32 => ValueKind::Int32(read_u32(bytes) as i32),
      Type::INT64 => ValueKind::Int64(read_u64(bytes) as i64),
      Type::INT96 => {
        let mut buf = [0u8; 12];
        buf.copy_from_slice(&bytes[..12]);
        ValueKind::Int96(Int96::from_bytes(&buf))
      },
      Type::FLOAT => ValueKind::Float(f32::from_bits(read_u32(bytes))),
      Type::DOUBLE => ValueKind::Double(f64::from_bits(read_u64(bytes))),
      Type::BYTE_ARRAY => ValueKind::ByteArray(ByteArray::from(&bytes[BYTE_ARRAY_LENGTH_SIZE..size])),
      Type::FIXED_LEN_BYTE_ARRAY => ValueKind::FixedLenByteArray(ByteArray::from(&bytes[..size]))
    };
    Ok(Some((kind, size)))
  }
}

#[inline]
fn read_u32(bytes: &[u8]) -> u32 {
  let mut buf = [0u8; 4];
  buf.copy_from_slice(&bytes[..4]);
  u32::from_le_bytes(buf)
}

#[inline]
fn read_u64(bytes: &[u8]) -> u64 {
  let mut buf = [0u8; 8];
  buf.copy_from_slice(&bytes[..8]);
  u64::from_le_bytes(buf)
}

/// Byte-stream writes. Each complete value becomes one row; bytes of a trailing
/// incomplete value are kept until the rest of it is written. A malformed value fails
/// the whole call with `InvalidData` and nothing is written.
impl io::Write for ColumnBuffer {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let mut bytes = mem::take(&mut self.pending);
    let pending_len = bytes.len();
    bytes.extend_from_slice(buf);
    let mut decoded = vec![];
    let mut pos = 0;
    loop {
      match self.decode_value(&bytes[pos..]) {
        Ok(Some((kind, size))) => {
          decoded.push(kind);
          pos += size;
        },
        Ok(None) => break,
        Err(e) => {
          bytes.truncate(pending_len);
          self.pending = bytes;
          return Err(e.into());
        }
      }
    }
    let n = decoded.len();
    for kind in decoded {
      self.page.values.push(kind)?;
    }
    self.append_defined_levels(n);
    self.pending = bytes.split_off(pos);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::io::{Read, Write};
  use std::sync::Arc;

  use crate::basic::Repetition;
  use crate::column::page::ValueBuffer;
  use crate::schema::types::{SchemaDescriptor, Type as SchemaType};

  fn column_buffer(repetition: Repetition, physical_type: Type) -> ColumnBuffer {
    let leaf = if physical_type == Type::FIXED_LEN_BYTE_ARRAY {
      SchemaType::fixed_len_byte_array("value", repetition, 2).unwrap()
    } else {
      SchemaType::primitive("value", repetition, physical_type).unwrap()
    };
    let schema = SchemaType::message("schema", vec![leaf]).unwrap();
    ColumnBuffer::new(SchemaDescriptor::new(Arc::new(schema)).unwrap().column(0))
  }

  #[test]
  fn test_write_rows_trailing_nulls() {
    let mut buffer = column_buffer(Repetition::OPTIONAL, Type::BYTE_ARRAY);
    buffer.write_row(&[Value::null(0, 0, 0)]).unwrap();
    buffer.write_row(&[Value::byte_array(ByteArray::from("test")).with_levels(0, 1)]).unwrap();
    buffer.write_row(&[Value::null(0, 0, 0)]).unwrap();
    assert_eq!(buffer.num_rows(), 3);
    assert_eq!(buffer.num_values(), 3);

    let page = buffer.page();
    assert_eq!(page.num_nulls(), 2);
    let mut slots = vec![Value::null(0, 0, 0); 4];
    let mut levels = page.levels();
    assert_eq!(levels.read_values(&mut slots).unwrap(), 3);
    assert!(slots[2].is_null());
    assert!(levels.read_values(&mut slots).unwrap_err().is_eof());
  }

  #[test]
  fn test_write_rows_empty_lists() {
    let mut buffer = column_buffer(Repetition::REPEATED, Type::BYTE_ARRAY);
    buffer.write_row(&[Value::null(0, 0, 0)]).unwrap();
    buffer.write_row(&[Value::byte_array(ByteArray::from("test")).with_levels(0, 1)]).unwrap();
    buffer.write_row(&[Value::null(0, 0, 0)]).unwrap();
    assert_eq!(buffer.num_rows(), 3);
    assert_eq!(buffer.page().rep_levels(), &[0, 0, 0]);
    assert_eq!(buffer.page().def_levels(), &[0, 1, 0]);
  }

  #[test]
  fn test_write_row_validation() {
    let mut buffer = column_buffer(Repetition::OPTIONAL, Type::INT32);
    // Wrong column
    assert!(buffer.write_row(&[Value::int32(1).with_column_index(1).with_levels(0, 1)]).is_err());
    // Wrong type
    assert!(buffer.write_row(&[Value::int64(1).with_levels(0, 1)]).is_err());
    // Defined value at null level
    assert!(buffer.write_row(&[Value::int32(1)]).is_err());
    // Null at defined level
    assert!(buffer.write_row(&[Value::null(0, 0, 1)]).is_err());
    // Two values for a non-repeated column
    assert!(buffer.write_row(&[Value::null(0, 0, 0), Value::null(0, 0, 0)]).is_err());
    // No values
    assert!(buffer.write_row(&[]).is_err());
    assert_eq!(buffer.num_rows(), 0);
    assert_eq!(buffer.num_values(), 0);

    let mut repeated = column_buffer(Repetition::REPEATED, Type::INT32);
    assert!(repeated.write_row(&[Value::int32(1).with_levels(1, 1)]).is_err());
    let row = [Value::int32(1).with_levels(0, 1), Value::int32(2).with_levels(0, 1)];
    assert!(repeated.write_row(&row).is_err());
    let row = [Value::int32(1).with_levels(0, 1), Value::int32(2).with_levels(1, 1)];
    repeated.write_row(&row).unwrap();
    assert_eq!(repeated.num_rows(), 1);
    assert_eq!(repeated.num_values(), 2);
  }

  #[test]
  fn test_typed_writes() {
    let mut buffer = column_buffer(Repetition::REQUIRED, Type::INT32);
    assert_eq!(buffer.write_int32s(&[1, 2, 3]).unwrap(), 3);
    assert!(buffer.write_int64s(&[1]).is_err());
    assert!(buffer.write_fixed_len_byte_arrays(&[1, 2]).is_err());
    assert_eq!(buffer.num_rows(), 3);
    assert_eq!(buffer.page().buffer(), &ValueBuffer::Int32(vec![1, 2, 3]));

    let mut buffer = column_buffer(Repetition::OPTIONAL, Type::FIXED_LEN_BYTE_ARRAY);
    assert_eq!(buffer.write_fixed_len_byte_arrays(b"abcde").unwrap(), 2);
    assert_eq!(buffer.page().def_levels(), &[1, 1]);
    let mut dst = [0u8; 4];
    assert_eq!(buffer.page().values().read_fixed_len_byte_arrays(&mut dst).unwrap(), 2);
    assert_eq!(&dst, b"abcd");
  }

  #[test]
  fn test_typed_fixed_len_writes_check_length() {
    let mut buffer = column_buffer(Repetition::REQUIRED, Type::FIXED_LEN_BYTE_ARRAY);
    let values = vec![ByteArray::from("x"), ByteArray::from("abc")];
    assert!(buffer.write_batch::<FixedLenByteArrayType>(&values).is_err());
    // Valid values before the bad one are not written either
    let values = vec![ByteArray::from("ab"), ByteArray::from("abc")];
    assert!(buffer.write_batch::<FixedLenByteArrayType>(&values).is_err());
    assert_eq!(buffer.num_rows(), 0);
    assert_eq!(buffer.num_values(), 0);
    assert!(buffer.write_byte_arrays(&[ByteArray::from("ab")]).is_err());

    let values = vec![ByteArray::from("ab"), ByteArray::from("cd")];
    assert_eq!(buffer.write_batch::<FixedLenByteArrayType>(&values).unwrap(), 2);
    let mut dst = [0u8; 4];
    assert_eq!(buffer.page().values().read_fixed_len_byte_arrays(&mut dst).unwrap(), 2);
    assert_eq!(&dst, b"abcd");
  }

  #[test]
  fn test_byte_stream_writes() {
    let mut buffer = column_buffer(Repetition::REQUIRED, Type::INT64);
    let mut bytes = vec![];
    bytes.extend_from_slice(&7i64.to_le_bytes());
    bytes.extend_from_slice(&(-1i64).to_le_bytes());
    // Incomplete value is held back
    assert_eq!(buffer.write(&bytes[..11]).unwrap(), 11);
    assert_eq!(buffer.num_rows(), 1);
    buffer.write_all(&bytes[11..]).unwrap();
    assert_eq!(buffer.num_rows(), 2);
    let mut dst = [0i64; 2];
    assert_eq!(buffer.page().values().read_int64s(&mut dst).unwrap(), 2);
    assert_eq!(dst, [7, -1]);

    let mut buffer = column_buffer(Repetition::REQUIRED, Type::BOOLEAN);
    assert!(buffer.write(&[1, 2]).is_err());
    assert_eq!(buffer.num_rows(), 0);
    buffer.write_all(&[1, 0]).unwrap();
    assert_eq!(buffer.page().buffer(), &ValueBuffer::Boolean(vec![true, false]));
  }

  #[test]
  fn test_byte_stream_parity() {
    let mut typed = column_buffer(Repetition::REQUIRED, Type::BYTE_ARRAY);
    let values = vec![ByteArray::from("hello"), ByteArray::from(""), ByteArray::from("!")];
    typed.write_byte_arrays(&values).unwrap();

    let mut bytes = vec![];
    typed.page().values().read_to_end(&mut bytes).unwrap();
    let mut streamed = column_buffer(Repetition::REQUIRED, Type::BYTE_ARRAY);
    streamed.write_all(&bytes).unwrap();
    assert_eq!(streamed.page(), typed.page());
  }

  #[test]
  fn test_reset() {
    let mut buffer = column_buffer(Repetition::OPTIONAL, Type::DOUBLE);
    buffer.write_doubles(&[1.0, 2.0]).unwrap();
    buffer.write(&[0u8; 3]).unwrap();
    buffer.reset();
    assert_eq!(buffer.num_rows(), 0);
    assert_eq!(buffer.num_values(), 0);
    assert!(buffer.page().def_levels().is_empty());
    buffer.write_all(&1.5f64.to_le_bytes()).unwrap();
    assert_eq!(buffer.page().buffer(), &ValueBuffer::Double(vec![1.5]));
  }
}
