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

//! Contains the `Page` struct, a typed, immutable run of values of one column, and
//! the readers that expose its contents.
//!
//! A page can be read through three views over the same storage:
//!
//! * [`ValueReader`] typed bulk reads, one method per physical type, e.g.
//!   [`ValueReader::read_int32s`];
//! * [`ValueReader`] as [`std::io::Read`], a byte stream of fixed-width little-endian
//!   values, with byte arrays prefixed by a 4-byte length;
//! * [`LevelReader`], every logical slot as a [`Value`], nulls included.
//!
//! The first two only see non-null values. All views report end of data once
//! exhausted, and keep reporting it on every further call.

use std::borrow::Cow;
use std::cmp;
use std::io;

use crate::basic::Type;
use crate::data_type::*;
use crate::errors::{ParquetError, Result};
use crate::schema::types::ColumnDescPtr;
use crate::value::{Row, Value, ValueKind};

/// Size in bytes of the length prefix of byte array values in the byte-stream view.
pub const BYTE_ARRAY_LENGTH_SIZE: usize = 4;

// ----------------------------------------------------------------------
// Value buffers

/// Growable storage for the non-null values of one column, one variant per physical
/// type.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueBuffer {
  Boolean(Vec<bool>),
  Int32(Vec<i32>),
  Int64(Vec<i64>),
  Int96(Vec<Int96>),
  Float(Vec<f32>),
  Double(Vec<f64>),
  ByteArray(Vec<ByteArray>),
  FixedLenByteArray(Vec<ByteArray>)
}

/// Applies `$body` to the vector held by any variant of `$buffer`.
macro_rules! with_values {
  ($buffer:expr, $values:ident => $body:expr) => {
    match $buffer {
      ValueBuffer::Boolean($values) => $body,
      ValueBuffer::Int32($values) => $body,
      ValueBuffer::Int64($values) => $body,
      ValueBuffer::Int96($values) => $body,
      ValueBuffer::Float($values) => $body,
      ValueBuffer::Double($values) => $body,
      ValueBuffer::ByteArray($values) => $body,
      ValueBuffer::FixedLenByteArray($values) => $body
    }
  };
}

impl ValueBuffer {
  /// Creates an empty buffer for values of `physical_type`.
  pub fn new(physical_type: Type) -> Self {
    match physical_type {
      Type::BOOLEAN => ValueBuffer::Boolean(vec![]),
      Type::INT32 => ValueBuffer::Int32(vec![]),
      Type::INT64 => ValueBuffer::Int64(vec![]),
      Type::INT96 => ValueBuffer::Int96(vec![]),
      Type::FLOAT => ValueBuffer::Float(vec![]),
      Type::DOUBLE => ValueBuffer::Double(vec![]),
      Type::BYTE_ARRAY => ValueBuffer::ByteArray(vec![]),
      Type::FIXED_LEN_BYTE_ARRAY => ValueBuffer::FixedLenByteArray(vec![])
    }
  }

  pub fn physical_type(&self) -> Type {
    match *self {
      ValueBuffer::Boolean(_) => Type::BOOLEAN,
      ValueBuffer::Int32(_) => Type::INT32,
      ValueBuffer::Int64(_) => Type::INT64,
      ValueBuffer::Int96(_) => Type::INT96,
      ValueBuffer::Float(_) => Type::FLOAT,
      ValueBuffer::Double(_) => Type::DOUBLE,
      ValueBuffer::ByteArray(_) => Type::BYTE_ARRAY,
      ValueBuffer::FixedLenByteArray(_) => Type::FIXED_LEN_BYTE_ARRAY
    }
  }

  pub fn len(&self) -> usize {
    with_values!(self, values => values.len())
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn clear(&mut self) {
    with_values!(self, values => values.clear())
  }

  /// Appends a non-null payload. Fails if the payload is null or of another type.
  pub fn push(&mut self, kind: ValueKind) -> Result<()> {
    match (self, kind) {
      (&mut ValueBuffer::Boolean(ref mut values), ValueKind::Boolean(v)) => values.push(v),
      (&mut ValueBuffer::Int32(ref mut values), ValueKind::Int32(v)) => values.push(v),
      (&mut ValueBuffer::Int64(ref mut values), ValueKind::Int64(v)) => values.push(v),
      (&mut ValueBuffer::Int96(ref mut values), ValueKind::Int96(v)) => values.push(v),
      (&mut ValueBuffer::Float(ref mut values), ValueKind::Float(v)) => values.push(v),
      (&mut ValueBuffer::Double(ref mut values), ValueKind::Double(v)) => values.push(v),
      (&mut ValueBuffer::ByteArray(ref mut values), ValueKind::ByteArray(v)) => values.push(v),
      (&mut ValueBuffer::FixedLenByteArray(ref mut values), ValueKind::FixedLenByteArray(v)) => {
        values.push(v)
      },
      (buffer, kind) => {
        return Err(general_err!(
          "Cannot append {:?} value to {} buffer", kind.physical_type(), buffer.physical_type()
        ))
      }
    }
    Ok(())
  }

  /// Returns a copy of the `i`th value's payload.
  pub fn get(&self, i: usize) -> ValueKind {
    match *self {
      ValueBuffer::Boolean(ref values) => ValueKind::Boolean(values[i]),
      ValueBuffer::Int32(ref values) => ValueKind::Int32(values[i]),
      ValueBuffer::Int64(ref values) => ValueKind::Int64(values[i]),
      ValueBuffer::Int96(ref values) => ValueKind::Int96(values[i]),
      ValueBuffer::Float(ref values) => ValueKind::Float(values[i]),
      ValueBuffer::Double(ref values) => ValueKind::Double(values[i]),
      ValueBuffer::ByteArray(ref values) => ValueKind::ByteArray(values[i].clone()),
      ValueBuffer::FixedLenByteArray(ref values) => ValueKind::FixedLenByteArray(values[i].clone())
    }
  }

  /// Returns a new buffer with copies of the values in `start..end`.
  pub fn slice(&self, start: usize, end: usize) -> ValueBuffer {
    match *self {
      ValueBuffer::Boolean(ref values) => ValueBuffer::Boolean(values[start..end].to_vec()),
      ValueBuffer::Int32(ref values) => ValueBuffer::Int32(values[start..end].to_vec()),
      ValueBuffer::Int64(ref values) => ValueBuffer::Int64(values[start..end].to_vec()),
      ValueBuffer::Int96(ref values) => ValueBuffer::Int96(values[start..end].to_vec()),
      ValueBuffer::Float(ref values) => ValueBuffer::Float(values[start..end].to_vec()),
      ValueBuffer::Double(ref values) => ValueBuffer::Double(values[start..end].to_vec()),
      ValueBuffer::ByteArray(ref values) => ValueBuffer::ByteArray(values[start..end].to_vec()),
      ValueBuffer::FixedLenByteArray(ref values) => {
        ValueBuffer::FixedLenByteArray(values[start..end].to_vec())
      }
    }
  }

  /// Returns the size in bytes of the `i`th value in the byte-stream view.
  pub fn value_byte_size(&self, i: usize) -> usize {
    match *self {
      ValueBuffer::Boolean(_) => 1,
      ValueBuffer::Int32(_) | ValueBuffer::Float(_) => 4,
      ValueBuffer::Int64(_) | ValueBuffer::Double(_) => 8,
      ValueBuffer::Int96(_) => 12,
      ValueBuffer::ByteArray(ref values) => BYTE_ARRAY_LENGTH_SIZE + values[i].len(),
      ValueBuffer::FixedLenByteArray(ref values) => values[i].len()
    }
  }

  /// Copies the byte-stream form of the `i`th value, starting `offset` bytes into it,
  /// into `dst`. Returns the number of bytes copied.
  fn copy_value_bytes(&self, i: usize, offset: usize, dst: &mut [u8]) -> usize {
    match *self {
      ValueBuffer::Boolean(ref values) => copy_bytes(&[values[i] as u8], offset, dst),
      ValueBuffer::Int32(ref values) => copy_bytes(&values[i].to_le_bytes(), offset, dst),
      ValueBuffer::Int64(ref values) => copy_bytes(&values[i].to_le_bytes(), offset, dst),
      ValueBuffer::Int96(ref values) => copy_bytes(&values[i].to_bytes(), offset, dst),
      ValueBuffer::Float(ref values) => copy_bytes(&values[i].to_le_bytes(), offset, dst),
      ValueBuffer::Double(ref values) => copy_bytes(&values[i].to_le_bytes(), offset, dst),
      ValueBuffer::ByteArray(ref values) => {
        let len_bytes = (values[i].len() as u32).to_le_bytes();
        let mut copied = 0;
        if offset < BYTE_ARRAY_LENGTH_SIZE {
          copied = copy_bytes(&len_bytes, offset, dst);
        }
        let data_offset = (offset + copied).saturating_sub(BYTE_ARRAY_LENGTH_SIZE);
        if offset + copied >= BYTE_ARRAY_LENGTH_SIZE {
          copied += copy_bytes(values[i].data(), data_offset, &mut dst[copied..]);
        }
        copied
      },
      ValueBuffer::FixedLenByteArray(ref values) => copy_bytes(values[i].data(), offset, dst)
    }
  }
}

#[inline]
fn copy_bytes(src: &[u8], offset: usize, dst: &mut [u8]) -> usize {
  let n = cmp::min(src.len() - offset, dst.len());
  dst[..n].copy_from_slice(&src[offset..offset + n]);
  n
}

// ----------------------------------------------------------------------
// Pages

/// A typed, read-only run of values of one column, with the definition and repetition
/// levels of every slot.
///
/// Levels are only stored when the column's maximum level is non-zero. A slot whose
/// definition level is below the maximum is null and has no entry in the value buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
  pub(crate) descr: ColumnDescPtr,
  pub(crate) values: ValueBuffer,
  pub(crate) def_levels: Vec<u8>,
  pub(crate) rep_levels: Vec<u8>,
  pub(crate) num_rows: usize
}

impl Page {
  /// Creates an empty page for the column described by `descr`.
  pub fn empty(descr: ColumnDescPtr) -> Self {
    let values = ValueBuffer::new(descr.physical_type());
    Self { descr, values, def_levels: vec![], rep_levels: vec![], num_rows: 0 }
  }

  /// Creates a page from decoded values and levels, checking that they are
  /// consistent with each other and with the column.
  pub fn new(
    descr: ColumnDescPtr,
    values: ValueBuffer,
    def_levels: Vec<u8>,
    rep_levels: Vec<u8>
  ) -> Result<Self> {
    if values.physical_type() != descr.physical_type() {
      return Err(general_err!(
        "Page of {} values for column '{}' of type {}",
        values.physical_type(), descr.path(), descr.physical_type()
      ));
    }
    let max_def_level = descr.max_def_level();
    let max_rep_level = descr.max_rep_level();
    let num_values = if max_def_level > 0 { def_levels.len() } else { values.len() };
    if max_def_level == 0 && !def_levels.is_empty() {
      return Err(general_err!("Unexpected definition levels for required column '{}'", descr.path()));
    }
    if max_rep_level == 0 && !rep_levels.is_empty() {
      return Err(general_err!("Unexpected repetition levels for column '{}'", descr.path()));
    }
    if max_rep_level > 0 && rep_levels.len() != num_values {
      return Err(general_err!(
        "Expected {} repetition levels, got {}", num_values, rep_levels.len()
      ));
    }
    if def_levels.iter().any(|&d| d > max_def_level) {
      return Err(general_err!("Definition level above maximum {}", max_def_level));
    }
    if rep_levels.iter().any(|&r| r > max_rep_level) {
      return Err(general_err!("Repetition level above maximum {}", max_rep_level));
    }
    if rep_levels.first().map_or(false, |&r| r != 0) {
      return Err(general_err!("Page must start at a row boundary"));
    }
    let num_defined = if max_def_level > 0 {
      def_levels.iter().filter(|&&d| d == max_def_level).count()
    } else {
      values.len()
    };
    if num_defined != values.len() {
      return Err(general_err!(
        "Page has {} defined slots but {} values", num_defined, values.len()
      ));
    }
    if let ValueBuffer::FixedLenByteArray(ref v) = values {
      let type_length = descr.type_length() as usize;
      if v.iter().any(|b| b.len() != type_length) {
        return Err(general_err!("FIXED_LEN_BYTE_ARRAY values must be {} bytes", type_length));
      }
    }
    let num_rows = if max_rep_level > 0 {
      rep_levels.iter().filter(|&&r| r == 0).count()
    } else {
      num_values
    };
    Ok(Self { descr, values, def_levels, rep_levels, num_rows })
  }

  pub fn column_descr(&self) -> &ColumnDescPtr {
    &self.descr
  }

  pub fn column_index(&self) -> u16 {
    self.descr.column_index()
  }

  pub fn physical_type(&self) -> Type {
    self.descr.physical_type()
  }

  pub fn max_definition_level(&self) -> u8 {
    self.descr.max_def_level()
  }

  pub fn max_repetition_level(&self) -> u8 {
    self.descr.max_rep_level()
  }

  /// Number of logical slots in this page, nulls included.
  pub fn num_values(&self) -> usize {
    if self.descr.max_def_level() > 0 {
      self.def_levels.len()
    } else {
      self.values.len()
    }
  }

  /// Number of null slots in this page.
  pub fn num_nulls(&self) -> usize {
    self.num_values() - self.values.len()
  }

  /// Number of rows that start in this page.
  pub fn num_rows(&self) -> usize {
    self.num_rows
  }

  /// Returns the non-null values of this page.
  pub fn buffer(&self) -> &ValueBuffer {
    &self.values
  }

  /// Definition levels of every slot, empty for required columns.
  pub fn def_levels(&self) -> &[u8] {
    &self.def_levels
  }

  /// Repetition levels of every slot, empty for non-repeated columns.
  pub fn rep_levels(&self) -> &[u8] {
    &self.rep_levels
  }

  /// Returns a reader over the non-null values, with typed and byte-stream access.
  pub fn values(&self) -> ValueReader {
    ValueReader { values: &self.values, index: 0, offset: 0 }
  }

  /// Returns a reader over every slot of this page, nulls included.
  pub fn levels(&self) -> LevelReader {
    LevelReader { page: Cow::Borrowed(self), cursor: LevelCursor::default() }
  }

  /// Returns the slot at `slot` as a value, given the index of the next non-null
  /// value at or after that slot.
  fn value_at(&self, slot: usize, value_index: usize) -> Value {
    let rep = if self.rep_levels.is_empty() { 0 } else { self.rep_levels[slot] };
    let max_def_level = self.descr.max_def_level();
    let def = if self.def_levels.is_empty() { max_def_level } else { self.def_levels[slot] };
    let column_index = self.descr.column_index();
    if def < max_def_level {
      Value::null(column_index, rep, def)
    } else {
      Value::new(self.values.get(value_index), column_index, rep, def)
    }
  }

  fn is_null_slot(&self, slot: usize) -> bool {
    !self.def_levels.is_empty() && self.def_levels[slot] < self.descr.max_def_level()
  }

  fn starts_row(&self, slot: usize) -> bool {
    self.rep_levels.is_empty() || self.rep_levels[slot] == 0
  }

  /// Splits this page at row boundaries into pages of at most `max_rows` rows each.
  /// An empty page splits into no pages.
  pub fn split(&self, max_rows: usize) -> Vec<Page> {
    let max_rows = cmp::max(max_rows, 1);
    if self.num_rows <= max_rows {
      return if self.num_values() == 0 { vec![] } else { vec![self.clone()] };
    }
    let mut pages = vec![];
    let num_values = self.num_values();
    let (mut start_slot, mut start_value) = (0, 0);
    let (mut rows, mut value_index) = (0, 0);
    for slot in 0..num_values {
      if self.starts_row(slot) {
        if rows == max_rows {
          pages.push(self.slice(start_slot, slot, start_value, value_index, rows));
          start_slot = slot;
          start_value = value_index;
          rows = 0;
        }
        rows += 1;
      }
      if !self.is_null_slot(slot) {
        value_index += 1;
      }
    }
    pages.push(self.slice(start_slot, num_values, start_value, value_index, rows));
    pages
  }

  fn slice(
    &self,
    start_slot: usize,
    end_slot: usize,
    start_value: usize,
    end_value: usize,
    num_rows: usize
  ) -> Page {
    let levels = |levels: &[u8]| {
      if levels.is_empty() { vec![] } else { levels[start_slot..end_slot].to_vec() }
    };
    Page {
      descr: self.descr.clone(),
      values: self.values.slice(start_value, end_value),
      def_levels: levels(&self.def_levels),
      rep_levels: levels(&self.rep_levels),
      num_rows
    }
  }
}

// ----------------------------------------------------------------------
// Value reader: typed and byte-stream views of the non-null values

/// Reads the non-null values of a page, either as whole typed elements or as a
/// stream of bytes.
///
/// Typed reads return the number of elements transferred, which may be fewer than
/// requested. Once every value has been consumed they fail with
/// [`ParquetError::EOF`], on every call. As an [`io::Read`], the reader returns
/// `Ok(0)` at end of data. Reads of a type other than the page's physical type fail.
pub struct ValueReader<'a> {
  values: &'a ValueBuffer,
  index: usize,
  // bytes of the value at `index` already consumed by the byte-stream view
  offset: usize
}

impl<'a> ValueReader<'a> {
  /// Number of values not read yet.
  pub fn remaining(&self) -> usize {
    self.values.len() - self.index
  }

  pub fn physical_type(&self) -> Type {
    self.values.physical_type()
  }

  /// Reads values of data type `T` into `dst`, returns the number read.
  pub fn read_batch<T: DataType>(&mut self, dst: &mut [T::T]) -> Result<usize> {
    let src = T::get_values(self.values).ok_or_else(|| {
      general_err!(
        "Cannot read {} values from {} page", T::get_physical_type(), self.values.physical_type()
      )
    })?;
    self.check_aligned()?;
    let remaining = src.len() - self.index;
    if remaining == 0 {
      return Err(eof_err!("No more values in page"));
    }
    let n = cmp::min(dst.len(), remaining);
    dst[..n].clone_from_slice(&src[self.index..self.index + n]);
    self.index += n;
    Ok(n)
  }

  pub fn read_booleans(&mut self, dst: &mut [bool]) -> Result<usize> {
    self.read_batch::<BoolType>(dst)
  }

  pub fn read_int32s(&mut self, dst: &mut [i32]) -> Result<usize> {
    self.read_batch::<Int32Type>(dst)
  }

  pub fn read_int64s(&mut self, dst: &mut [i64]) -> Result<usize> {
    self.read_batch::<Int64Type>(dst)
  }

  pub fn read_int96s(&mut self, dst: &mut [Int96]) -> Result<usize> {
    self.read_batch::<Int96Type>(dst)
  }

  pub fn read_floats(&mut self, dst: &mut [f32]) -> Result<usize> {
    self.read_batch::<FloatType>(dst)
  }

  pub fn read_doubles(&mut self, dst: &mut [f64]) -> Result<usize> {
    self.read_batch::<DoubleType>(dst)
  }

  /// Reads whole variable-length byte arrays, lengths implicit.
  pub fn read_byte_arrays(&mut self, dst: &mut [ByteArray]) -> Result<usize> {
    self.read_batch::<ByteArrayType>(dst)
  }

  /// Reads fixed-length byte arrays packed back to back into `dst`. Returns the number
  /// of elements read, each taking the column's type length in bytes.
  pub fn read_fixed_len_byte_arrays(&mut self, dst: &mut [u8]) -> Result<usize> {
    let src = FixedLenByteArrayType::get_values(self.values).ok_or_else(|| {
      general_err!(
        "Cannot read FIXED_LEN_BYTE_ARRAY values from {} page", self.values.physical_type()
      )
    })?;
    self.check_aligned()?;
    if self.index == src.len() {
      return Err(eof_err!("No more values in page"));
    }
    let mut written = 0;
    let mut n = 0;
    while self.index < src.len() && written + src[self.index].len() <= dst.len() {
      let value = src[self.index].data();
      dst[written..written + value.len()].copy_from_slice(value);
      written += value.len();
      self.index += 1;
      n += 1;
    }
    Ok(n)
  }

  fn check_aligned(&self) -> Result<()> {
    if self.offset != 0 {
      return Err(general_err!("Typed read in the middle of a value read as bytes"));
    }
    Ok(())
  }
}

impl<'a> io::Read for ValueReader<'a> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let mut written = 0;
    while written < buf.len() && self.index < self.values.len() {
      let copied = self.values.copy_value_bytes(self.index, self.offset, &mut buf[written..]);
      written += copied;
      self.offset += copied;
      if self.offset == self.values.value_byte_size(self.index) {
        self.index += 1;
        self.offset = 0;
      }
    }
    Ok(written)
  }
}

// ----------------------------------------------------------------------
// Level reader: every slot as a value

/// Position of a reader over the slots of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct LevelCursor {
  slot: usize,
  value_index: usize
}

impl LevelCursor {
  pub(crate) fn is_exhausted(&self, page: &Page) -> bool {
    self.slot >= page.num_values()
  }

  fn next_value(&mut self, page: &Page) -> Value {
    let value = page.value_at(self.slot, self.value_index);
    if !value.is_null() {
      self.value_index += 1;
    }
    self.slot += 1;
    value
  }

  pub(crate) fn read_values(&mut self, page: &Page, dst: &mut [Value]) -> Result<usize> {
    if self.is_exhausted(page) {
      return Err(eof_err!("No more values in page"));
    }
    let n = cmp::min(dst.len(), page.num_values() - self.slot);
    for v in dst[..n].iter_mut() {
      *v = self.next_value(page);
    }
    Ok(n)
  }

  /// Appends the values of the next row to `dst`: one slot at repetition level 0 and
  /// every following slot at a higher level.
  pub(crate) fn read_row(&mut self, page: &Page, dst: &mut Row) -> Result<usize> {
    if self.is_exhausted(page) {
      return Err(eof_err!("No more rows in page"));
    }
    let mut n = 0;
    loop {
      dst.push(self.next_value(page));
      n += 1;
      if self.is_exhausted(page) || page.starts_row(self.slot) {
        break;
      }
    }
    Ok(n)
  }
}

/// Reads every slot of a page as a [`Value`], nulls included, with the column index and
/// levels of the slot.
pub struct LevelReader<'a> {
  page: Cow<'a, Page>,
  cursor: LevelCursor
}

impl<'a> LevelReader<'a> {
  /// Reads up to `dst.len()` slots, returns the number read.
  pub fn read_values(&mut self, dst: &mut [Value]) -> Result<usize> {
    self.cursor.read_values(&self.page, dst)
  }

  /// Appends the values of the next row to `dst`, returns the number appended.
  pub fn read_row(&mut self, dst: &mut Row) -> Result<usize> {
    self.cursor.read_row(&self.page, dst)
  }
}

// ----------------------------------------------------------------------
// Page readers

/// API for reading pages from a column chunk. This offers an iterator like API to get
/// the next page.
pub trait PageReader {
  /// Gets the next page in the column chunk associated with this reader.
  /// Returns `None` if there's no page left.
  fn get_next_page(&mut self) -> Result<Option<Page>>;

  /// Gets the next page, or [`ParquetError::EOF`] once the column chunk is exhausted.
  fn read_page(&mut self) -> Result<Page> {
    self.get_next_page()?.ok_or_else(|| eof_err!("No more pages in column chunk"))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Read;
  use std::sync::Arc;

  use crate::basic::Repetition;
  use crate::schema::types::{SchemaDescriptor, Type as SchemaType};

  fn column(repetition: Repetition, physical_type: Type) -> ColumnDescPtr {
    let leaf = if physical_type == Type::FIXED_LEN_BYTE_ARRAY {
      SchemaType::fixed_len_byte_array("value", repetition, 3).unwrap()
    } else {
      SchemaType::primitive("value", repetition, physical_type).unwrap()
    };
    let schema = SchemaType::message("schema", vec![leaf]).unwrap();
    SchemaDescriptor::new(Arc::new(schema)).unwrap().column(0)
  }

  fn int32_page(values: Vec<i32>) -> Page {
    Page::new(column(Repetition::REQUIRED, Type::INT32), ValueBuffer::Int32(values), vec![], vec![])
      .unwrap()
  }

  #[test]
  fn test_value_buffer_push() {
    let mut buffer = ValueBuffer::new(Type::DOUBLE);
    buffer.push(ValueKind::Double(1.5)).unwrap();
    assert!(buffer.push(ValueKind::Float(1.5)).is_err());
    assert!(buffer.push(ValueKind::Null).is_err());
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.get(0), ValueKind::Double(1.5));
    buffer.clear();
    assert!(buffer.is_empty());
  }

  #[test]
  fn test_typed_read_short_and_eof() {
    let page = int32_page((0..10).collect());
    let mut reader = page.values();
    let mut buf = vec![0; 4];
    assert_eq!(reader.read_int32s(&mut buf).unwrap(), 4);
    assert_eq!(buf, vec![0, 1, 2, 3]);
    assert_eq!(reader.remaining(), 6);
    let mut buf = vec![0; 10];
    assert_eq!(reader.read_int32s(&mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], &[4, 5, 6, 7, 8, 9]);
    assert!(reader.read_int32s(&mut buf).unwrap_err().is_eof());
    assert!(reader.read_int32s(&mut buf).unwrap_err().is_eof());
  }

  #[test]
  fn test_typed_read_type_mismatch() {
    let page = int32_page(vec![1]);
    let mut reader = page.values();
    let err = reader.read_int64s(&mut [0; 1]).unwrap_err();
    assert!(!err.is_eof());
    let err = reader.read_fixed_len_byte_arrays(&mut [0; 3]).unwrap_err();
    assert!(!err.is_eof());
  }

  #[test]
  fn test_byte_stream_read() {
    let page = int32_page(vec![1, 256]);
    let mut reader = page.values();
    let mut buf = [0u8; 3];
    // Partial values are allowed in the byte-stream view
    assert_eq!(reader.read(&mut buf).unwrap(), 3);
    assert_eq!(buf, [1, 0, 0]);
    assert!(reader.read_int32s(&mut [0; 1]).is_err());
    let mut rest = vec![];
    reader.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, vec![0, 0, 1, 0, 0]);
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
  }

  #[test]
  fn test_byte_array_stream_is_length_prefixed() {
    let descr = column(Repetition::REQUIRED, Type::BYTE_ARRAY);
    let values = vec![ByteArray::from("A"), ByteArray::from("BC")];
    let page = Page::new(descr, ValueBuffer::ByteArray(values.clone()), vec![], vec![]).unwrap();

    let mut bytes = vec![];
    page.values().read_to_end(&mut bytes).unwrap();
    assert_eq!(bytes, vec![1, 0, 0, 0, b'A', 2, 0, 0, 0, b'B', b'C']);

    // Byte by byte
    let mut reader = page.values();
    let mut bytes = vec![];
    let mut one = [0u8; 1];
    while reader.read(&mut one).unwrap() == 1 {
      bytes.push(one[0]);
    }
    assert_eq!(bytes.len(), 11);
    assert_eq!(bytes[9..], [b'B', b'C']);

    let mut dst = vec![ByteArray::new(); 3];
    let mut reader = page.values();
    assert_eq!(reader.read_byte_arrays(&mut dst).unwrap(), 2);
    assert_eq!(&dst[..2], &values[..]);
    assert!(reader.read_byte_arrays(&mut dst).unwrap_err().is_eof());
  }

  #[test]
  fn test_fixed_len_byte_array_read() {
    let descr = column(Repetition::REQUIRED, Type::FIXED_LEN_BYTE_ARRAY);
    let values = vec![ByteArray::from("123"), ByteArray::from("456"), ByteArray::from("789")];
    let page = Page::new(descr.clone(), ValueBuffer::FixedLenByteArray(values), vec![], vec![])
      .unwrap();
    let mut reader = page.values();
    let mut buf = [0u8; 7];
    assert_eq!(reader.read_fixed_len_byte_arrays(&mut buf).unwrap(), 2);
    assert_eq!(&buf[..6], b"123456");
    assert_eq!(reader.read_fixed_len_byte_arrays(&mut buf).unwrap(), 1);
    assert_eq!(&buf[..3], b"789");
    assert!(reader.read_fixed_len_byte_arrays(&mut buf).unwrap_err().is_eof());

    let bad = Page::new(
      descr, ValueBuffer::FixedLenByteArray(vec![ByteArray::from("12")]), vec![], vec![]
    );
    assert!(bad.is_err());
  }

  #[test]
  fn test_optional_page_counts_and_levels() {
    let descr = column(Repetition::OPTIONAL, Type::BYTE_ARRAY);
    let page = Page::new(
      descr, ValueBuffer::ByteArray(vec![ByteArray::from("test")]), vec![0, 1, 0], vec![]
    ).unwrap();
    assert_eq!(page.num_values(), 3);
    assert_eq!(page.num_nulls(), 2);
    assert_eq!(page.num_rows(), 3);

    let mut reader = page.levels();
    let mut dst = vec![Value::null(9, 9, 9); 5];
    assert_eq!(reader.read_values(&mut dst).unwrap(), 3);
    assert_eq!(dst[0], Value::null(0, 0, 0));
    assert_eq!(dst[1], Value::new(ValueKind::ByteArray(ByteArray::from("test")), 0, 0, 1));
    assert_eq!(dst[2], Value::null(0, 0, 0));
    assert!(reader.read_values(&mut dst).unwrap_err().is_eof());

    // The typed view only sees non-null values
    let mut typed = vec![ByteArray::new(); 3];
    assert_eq!(page.values().read_byte_arrays(&mut typed).unwrap(), 1);
  }

  #[test]
  fn test_repeated_page_rows() {
    let descr = column(Repetition::REPEATED, Type::INT64);
    // rows: [], [1, 2], []
    let page = Page::new(
      descr, ValueBuffer::Int64(vec![1, 2]), vec![0, 1, 1, 0], vec![0, 0, 1, 0]
    ).unwrap();
    assert_eq!(page.num_rows(), 3);
    let mut reader = page.levels();
    let mut row = vec![];
    assert_eq!(reader.read_row(&mut row).unwrap(), 1);
    assert_eq!(reader.read_row(&mut row).unwrap(), 2);
    assert_eq!(reader.read_row(&mut row).unwrap(), 1);
    assert!(reader.read_row(&mut row).unwrap_err().is_eof());
    assert_eq!(row.len(), 4);
    assert!(row[0].is_null() && row[3].is_null());
    assert_eq!(*row[2].kind(), ValueKind::Int64(2));
    assert_eq!(row[2].repetition_level(), 1);
  }

  #[test]
  fn test_page_validation() {
    let optional = column(Repetition::OPTIONAL, Type::INT32);
    // More defined slots than values
    assert!(Page::new(optional.clone(), ValueBuffer::Int32(vec![]), vec![1], vec![]).is_err());
    // Level above maximum
    assert!(Page::new(optional.clone(), ValueBuffer::Int32(vec![]), vec![2], vec![]).is_err());
    // Wrong value type
    assert!(Page::new(optional.clone(), ValueBuffer::Int64(vec![]), vec![], vec![]).is_err());
    // Repetition levels for a non-repeated column
    assert!(Page::new(optional, ValueBuffer::Int32(vec![1]), vec![1], vec![0]).is_err());

    let repeated = column(Repetition::REPEATED, Type::INT32);
    // Must start at a row boundary
    assert!(Page::new(repeated.clone(), ValueBuffer::Int32(vec![1]), vec![1], vec![1]).is_err());
    // Missing repetition levels
    assert!(Page::new(repeated, ValueBuffer::Int32(vec![1]), vec![1], vec![]).is_err());
  }

  #[test]
  fn test_page_split() {
    let page = int32_page((0..10).collect());
    let pages = page.split(4);
    assert_eq!(pages.len(), 3);
    assert_eq!(pages.iter().map(|p| p.num_rows()).collect::<Vec<_>>(), vec![4, 4, 2]);
    assert_eq!(pages[2].buffer(), &ValueBuffer::Int32(vec![8, 9]));
    assert_eq!(page.split(10).len(), 1);
    assert!(int32_page(vec![]).split(10).is_empty());

    // rows: [1, 2], [], [3], []
    let descr = column(Repetition::REPEATED, Type::INT32);
    let page = Page::new(
      descr, ValueBuffer::Int32(vec![1, 2, 3]), vec![1, 1, 0, 1, 0], vec![0, 1, 0, 0, 0]
    ).unwrap();
    let pages = page.split(2);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].rep_levels(), &[0, 1, 0]);
    assert_eq!(pages[0].buffer(), &ValueBuffer::Int32(vec![1, 2]));
    assert_eq!(pages[1].def_levels(), &[1, 0]);
    assert_eq!(pages[1].buffer(), &ValueBuffer::Int32(vec![3]));
    assert_eq!(pages[1].num_rows(), 2);
  }

  #[test]
  fn test_read_page_eof() {
    struct Pages(Vec<Page>);
    impl PageReader for Pages {
      fn get_next_page(&mut self) -> Result<Option<Page>> {
        Ok(if self.0.is_empty() { None } else { Some(self.0.remove(0)) })
      }
    }
    let mut pages = Pages(vec![int32_page(vec![1])]);
    assert_eq!(pages.read_page().unwrap().num_values(), 1);
    assert!(pages.read_page().unwrap_err().is_eof());
    assert!(pages.read_page().unwrap_err().is_eof());
  }
}
