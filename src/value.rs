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

//! Values exchanged between shredded rows and column buffers.
//!
//! A [`Value`] is one slot of one leaf column: a typed payload or an explicit null,
//! annotated with the index of the column it belongs to and with the repetition and
//! definition levels that locate it in the nested record structure. A [`Row`] is the
//! ordered sequence of values for one record, grouped by column in leaf order.

use std::fmt;

use crate::basic::Type;
use crate::data_type::{ByteArray, Int96};

/// Payload of a [`Value`].
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
  /// No payload. The definition level of the owning value tells at which depth the
  /// path to the leaf stopped being defined.
  Null,
  Boolean(bool),
  Int32(i32),
  Int64(i64),
  Int96(Int96),
  Float(f32),
  Double(f64),
  ByteArray(ByteArray),
  FixedLenByteArray(ByteArray)
}

impl ValueKind {
  /// Returns physical type of this payload, `None` for nulls.
  pub fn physical_type(&self) -> Option<Type> {
    match *self {
      ValueKind::Null => None,
      ValueKind::Boolean(_) => Some(Type::BOOLEAN),
      ValueKind::Int32(_) => Some(Type::INT32),
      ValueKind::Int64(_) => Some(Type::INT64),
      ValueKind::Int96(_) => Some(Type::INT96),
      ValueKind::Float(_) => Some(Type::FLOAT),
      ValueKind::Double(_) => Some(Type::DOUBLE),
      ValueKind::ByteArray(_) => Some(Type::BYTE_ARRAY),
      ValueKind::FixedLenByteArray(_) => Some(Type::FIXED_LEN_BYTE_ARRAY)
    }
  }
}

/// One slot of a leaf column.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
  column_index: u16,
  repetition_level: u8,
  definition_level: u8,
  kind: ValueKind
}

impl Value {
  /// Creates a value with the given payload and levels.
  pub fn new(kind: ValueKind, column_index: u16, repetition_level: u8, definition_level: u8) -> Self {
    Self { column_index, repetition_level, definition_level, kind }
  }

  /// Creates a null value. The column index and levels are kept, so the null still
  /// belongs to its column when rows are reassembled.
  pub fn null(column_index: u16, repetition_level: u8, definition_level: u8) -> Self {
    Self::new(ValueKind::Null, column_index, repetition_level, definition_level)
  }

  pub fn column_index(&self) -> u16 {
    self.column_index
  }

  pub fn repetition_level(&self) -> u8 {
    self.repetition_level
  }

  pub fn definition_level(&self) -> u8 {
    self.definition_level
  }

  pub fn kind(&self) -> &ValueKind {
    &self.kind
  }

  pub fn into_kind(self) -> ValueKind {
    self.kind
  }

  pub fn is_null(&self) -> bool {
    self.kind == ValueKind::Null
  }

  pub fn physical_type(&self) -> Option<Type> {
    self.kind.physical_type()
  }

  /// Returns a copy of this value reassigned to `column_index`.
  pub fn with_column_index(mut self, column_index: u16) -> Self {
    self.column_index = column_index;
    self
  }

  /// Returns a copy of this value with new levels.
  pub fn with_levels(mut self, repetition_level: u8, definition_level: u8) -> Self {
    self.repetition_level = repetition_level;
    self.definition_level = definition_level;
    self
  }
}

macro_rules! value_constructor {
  ($METHOD:ident, $VARIANT:ident, $TY:ty) => {
    /// Creates a non-null value at the top level (repetition and definition level 0).
    pub fn $METHOD(value: $TY) -> Value {
      Value::new(ValueKind::$VARIANT(value), 0, 0, 0)
    }
  };
}

impl Value {
  value_constructor!(boolean, Boolean, bool);
  value_constructor!(int32, Int32, i32);
  value_constructor!(int64, Int64, i64);
  value_constructor!(int96, Int96, Int96);
  value_constructor!(float, Float, f32);
  value_constructor!(double, Double, f64);
  value_constructor!(byte_array, ByteArray, ByteArray);
  value_constructor!(fixed_len_byte_array, FixedLenByteArray, ByteArray);
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f, "C:{} R:{} D:{} ", self.column_index, self.repetition_level, self.definition_level
    )?;
    match self.kind {
      ValueKind::Null => write!(f, "null"),
      ValueKind::Boolean(v) => write!(f, "{}", v),
      ValueKind::Int32(v) => write!(f, "{}", v),
      ValueKind::Int64(v) => write!(f, "{}", v),
      ValueKind::Int96(ref v) => write!(f, "{}", v),
      ValueKind::Float(v) => write!(f, "{:?}", v),
      ValueKind::Double(v) => write!(f, "{:?}", v),
      ValueKind::ByteArray(ref v) | ValueKind::FixedLenByteArray(ref v) => {
        match v.as_utf8() {
          Some(s) => write!(f, "{:?}", s),
          None => write!(f, "{:?}", v.data())
        }
      }
    }
  }
}

/// Ordered sequence of values representing one shredded record. Values are grouped by
/// column index in ascending leaf order and every leaf column has at least one value,
/// nulls included.
pub type Row = Vec<Value>;

/// Splits `row` into per-column runs, one per leaf column in order from column 0. The
/// result has fewer than `num_columns` runs if the row ends early. Returns `Err` with
/// the position of the first value whose column index is out of order or unknown.
pub(crate) fn split_columns(
  row: &[Value],
  num_columns: usize
) -> ::std::result::Result<Vec<&[Value]>, usize> {
  let mut columns: Vec<&[Value]> = Vec::with_capacity(num_columns);
  let mut start = 0;
  while start < row.len() {
    let column = row[start].column_index() as usize;
    if column != columns.len() || column >= num_columns {
      return Err(start);
    }
    let mut end = start + 1;
    while end < row.len() && row[end].column_index() as usize == column {
      end += 1;
    }
    columns.push(&row[start..end]);
    start = end;
  }
  Ok(columns)
}
