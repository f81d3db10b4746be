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

//! Contains the `Record` struct that represents an application-shape nested record,
//! the input of shredding and the output of row assembly.

use std::fmt;

use crate::basic::Type as PhysicalType;
use crate::data_type::{ByteArray, Int96};
use crate::errors::{ParquetError, Result};
use crate::value::ValueKind;

/// `Record` represents a nested Parquet record: an ordered list of named fields, one per
/// field of the corresponding schema group.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
  fields: Vec<(String, Field)>
}

impl Record {
  /// Get the number of fields in this record.
  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  /// Returns the field-value pairs of this record.
  pub fn fields(&self) -> &[(String, Field)] {
    &self.fields
  }

  /// Returns the field named `name`, if any.
  pub fn get(&self, name: &str) -> Option<&Field> {
    self.fields.iter().find(|&&(ref key, _)| key == name).map(|&(_, ref field)| field)
  }

  fn field_at(&self, i: usize) -> Result<&Field> {
    self.fields.get(i).map(|&(_, ref field)| field).ok_or_else(|| {
      general_err!("Field index {} out of bound for record of {} fields", i, self.fields.len())
    })
  }
}

/// Trait for type-safe convenient access to fields within a Record.
pub trait RecordAccessor {
  fn is_null(&self, i: usize) -> Result<bool>;
  fn get_bool(&self, i: usize) -> Result<bool>;
  fn get_int(&self, i: usize) -> Result<i32>;
  fn get_long(&self, i: usize) -> Result<i64>;
  fn get_int96(&self, i: usize) -> Result<Int96>;
  fn get_float(&self, i: usize) -> Result<f32>;
  fn get_double(&self, i: usize) -> Result<f64>;
  fn get_bytes(&self, i: usize) -> Result<&ByteArray>;
  fn get_group(&self, i: usize) -> Result<&Record>;
  fn get_list(&self, i: usize) -> Result<&List>;
}

/// Macro to generate type-safe get_xxx methods for primitive types e.g. get_bool, get_int
macro_rules! record_primitive_accessor {
  ($METHOD:ident, $VARIANT:ident, $TY:ty) => {
    fn $METHOD(&self, i: usize) -> Result<$TY> {
      match *self.field_at(i)? {
        Field::$VARIANT(v) => Ok(v),
        ref other => Err(general_err!("Cannot access {} as {}",
          other.get_type_name(), stringify!($VARIANT)))
      }
    }
  }
}

/// Macro to generate type-safe get_xxx methods for reference types e.g. get_list
macro_rules! record_complex_accessor {
  ($METHOD:ident, $VARIANT:ident, $TY:ty) => {
    fn $METHOD(&self, i: usize) -> Result<&$TY> {
      match *self.field_at(i)? {
        Field::$VARIANT(ref v) => Ok(v),
        ref other => Err(general_err!("Cannot access {} as {}",
          other.get_type_name(), stringify!($VARIANT)))
      }
    }
  }
}

impl RecordAccessor for Record {
  fn is_null(&self, i: usize) -> Result<bool> {
    Ok(*self.field_at(i)? == Field::Null)
  }

  record_primitive_accessor!(get_bool, Bool, bool);
  record_primitive_accessor!(get_int, Int, i32);
  record_primitive_accessor!(get_long, Long, i64);
  record_primitive_accessor!(get_int96, Int96, Int96);
  record_primitive_accessor!(get_float, Float, f32);
  record_primitive_accessor!(get_double, Double, f64);
  record_complex_accessor!(get_bytes, Bytes, ByteArray);
  record_complex_accessor!(get_group, Group, Record);
  record_complex_accessor!(get_list, List, List);
}

/// Constructs a `Record` from the list of `fields` and returns it.
#[inline]
pub fn make_record(fields: Vec<(String, Field)>) -> Record {
  Record { fields }
}

impl fmt::Display for Record {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{{")?;
    for (i, &(ref key, ref value)) in self.fields.iter().enumerate() {
      write!(f, "{}", key)?;
      write!(f, ": ")?;
      write!(f, "{}", value)?;
      if i < self.fields.len() - 1 {
        write!(f, ", ")?;
      }
    }
    write!(f, "}}")
  }
}

/// `List` represents the elements of a repeated field. An empty list is a distinct
/// state from a null field.
#[derive(Clone, Debug, PartialEq)]
pub struct List {
  elements: Vec<Field>
}

impl List {
  /// Get the number of elements in this list.
  pub fn len(&self) -> usize {
    self.elements.len()
  }

  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  pub fn elements(&self) -> &[Field] {
    &self.elements
  }
}

/// Constructs a `List` from the list of `elements` and returns it.
#[inline]
pub fn make_list(elements: Vec<Field>) -> List {
  List { elements }
}

/// API to represent a single field in a `Record`.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
  // Primitive types

  /// Null value.
  Null,
  /// Boolean value (`true`, `false`).
  Bool(bool),
  /// Signed 32-bit integer.
  Int(i32),
  /// Signed 64-bit integer.
  Long(i64),
  /// Legacy 96-bit integer.
  Int96(Int96),
  /// IEEE 32-bit floating point value.
  Float(f32),
  /// IEEE 64-bit floating point value.
  Double(f64),
  /// Binary value, variable or fixed length.
  Bytes(ByteArray),

  // ----------------------------------------------------------------------
  // Complex types

  /// Struct, child elements are tuples of field-value pairs.
  Group(Record),
  /// Elements of a repeated field.
  List(List)
}

impl Field {
  /// Get the type name
  fn get_type_name(&self) -> &'static str {
    match *self {
      Field::Null => "Null",
      Field::Bool(_) => "Bool",
      Field::Int(_) => "Int",
      Field::Long(_) => "Long",
      Field::Int96(_) => "Int96",
      Field::Float(_) => "Float",
      Field::Double(_) => "Double",
      Field::Bytes(_) => "Bytes",
      Field::Group(_) => "Group",
      Field::List(_) => "List"
    }
  }

  /// Determines if this field represents a primitive value
  pub fn is_primitive(&self) -> bool {
    match *self {
      Field::Group(_) | Field::List(_) => false,
      _ => true
    }
  }

  /// Converts a value payload read from a column into a field.
  pub fn from_value_kind(kind: ValueKind) -> Self {
    match kind {
      ValueKind::Null => Field::Null,
      ValueKind::Boolean(v) => Field::Bool(v),
      ValueKind::Int32(v) => Field::Int(v),
      ValueKind::Int64(v) => Field::Long(v),
      ValueKind::Int96(v) => Field::Int96(v),
      ValueKind::Float(v) => Field::Float(v),
      ValueKind::Double(v) => Field::Double(v),
      ValueKind::ByteArray(v) | ValueKind::FixedLenByteArray(v) => Field::Bytes(v)
    }
  }

  /// Converts a primitive field into the value payload of a leaf column of
  /// `physical_type`. `type_length` is checked for fixed length byte arrays.
  pub fn to_value_kind(&self, physical_type: PhysicalType, type_length: i32) -> Result<ValueKind> {
    let kind = match (physical_type, self) {
      (_, &Field::Null) => ValueKind::Null,
      (PhysicalType::BOOLEAN, &Field::Bool(v)) => ValueKind::Boolean(v),
      (PhysicalType::INT32, &Field::Int(v)) => ValueKind::Int32(v),
      (PhysicalType::INT64, &Field::Long(v)) => ValueKind::Int64(v),
      (PhysicalType::INT96, &Field::Int96(v)) => ValueKind::Int96(v),
      (PhysicalType::FLOAT, &Field::Float(v)) => ValueKind::Float(v),
      (PhysicalType::DOUBLE, &Field::Double(v)) => ValueKind::Double(v),
      (PhysicalType::BYTE_ARRAY, &Field::Bytes(ref v)) => ValueKind::ByteArray(v.clone()),
      (PhysicalType::FIXED_LEN_BYTE_ARRAY, &Field::Bytes(ref v)) => {
        if v.len() as i32 != type_length {
          return Err(general_err!(
            "Expected {} bytes for FIXED_LEN_BYTE_ARRAY value, got {}", type_length, v.len()
          ));
        }
        ValueKind::FixedLenByteArray(v.clone())
      },
      (tp, other) => {
        return Err(general_err!("Cannot convert {} into {} value", other.get_type_name(), tp))
      }
    };
    Ok(kind)
  }
}

impl<'a> From<&'a str> for Field {
  fn from(s: &'a str) -> Self {
    Field::Bytes(ByteArray::from(s))
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Field::Null => write!(f, "null"),
      Field::Bool(value) => write!(f, "{}", value),
      Field::Int(value) => write!(f, "{}", value),
      Field::Long(value) => write!(f, "{}", value),
      Field::Int96(ref value) => write!(f, "{}", value),
      Field::Float(value) => write!(f, "{:?}", value),
      Field::Double(value) => write!(f, "{:?}", value),
      Field::Bytes(ref value) => {
        match value.as_utf8() {
          Some(s) => write!(f, "\"{}\"", s),
          None => write!(f, "{:?}", value.data())
        }
      },
      Field::Group(ref fields) => write!(f, "{}", fields),
      Field::List(ref list) => {
        let elems = &list.elements;
        write!(f, "[")?;
        for (i, field) in elems.iter().enumerate() {
          write!(f, "{}", field)?;
          if i < elems.len() - 1 {
            write!(f, ", ")?;
          }
        }
        write!(f, "]")
      }
    }
  }
}
