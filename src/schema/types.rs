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

//! Contains structs and methods to build Parquet schema and schema descriptors.
//!
//! A schema is a tree of [`Type`]s: groups with children and primitive leaves. A
//! [`SchemaDescriptor`] flattens the tree into leaf columns, assigning each leaf a stable
//! depth-first index along with the maximum definition and repetition levels that the
//! shredding algorithm needs.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::basic::{Repetition, Type as PhysicalType};
use crate::errors::{ParquetError, Result};

// ----------------------------------------------------------------------
// Parquet Type definitions

/// Type alias for `Arc<Type>`.
pub type TypePtr = Arc<Type>;
/// Type alias for `Arc<SchemaDescriptor>`.
pub type SchemaDescPtr = Arc<SchemaDescriptor>;
/// Type alias for `Arc<ColumnDescriptor>`.
pub type ColumnDescPtr = Arc<ColumnDescriptor>;

/// Basic type info. This contains information such as the name of the type and its
/// repetition. The repetition is only unset for the root (message) type.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicTypeInfo {
  name: String,
  repetition: Option<Repetition>
}

impl BasicTypeInfo {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn repetition(&self) -> Option<Repetition> {
    self.repetition
  }
}

/// Representation of a Parquet type: either a primitive leaf or a group of fields.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
  PrimitiveType {
    basic_info: BasicTypeInfo,
    physical_type: PhysicalType,
    type_length: i32
  },
  GroupType {
    basic_info: BasicTypeInfo,
    fields: Vec<TypePtr>
  }
}

impl Type {
  /// Creates a primitive leaf of any physical type except `FIXED_LEN_BYTE_ARRAY`,
  /// which needs a length, see [`Type::fixed_len_byte_array`].
  pub fn primitive(name: &str, repetition: Repetition, physical_type: PhysicalType) -> Result<Type> {
    if physical_type == PhysicalType::FIXED_LEN_BYTE_ARRAY {
      return Err(schema_err!("FIXED_LEN_BYTE_ARRAY field '{}' needs a type length", name));
    }
    Ok(Type::PrimitiveType {
      basic_info: BasicTypeInfo { name: String::from(name), repetition: Some(repetition) },
      physical_type,
      type_length: -1
    })
  }

  /// Creates a `FIXED_LEN_BYTE_ARRAY` leaf whose values are exactly `length` bytes.
  pub fn fixed_len_byte_array(name: &str, repetition: Repetition, length: i32) -> Result<Type> {
    if length <= 0 {
      return Err(schema_err!("Invalid FIXED_LEN_BYTE_ARRAY length: {}", length));
    }
    Ok(Type::PrimitiveType {
      basic_info: BasicTypeInfo { name: String::from(name), repetition: Some(repetition) },
      physical_type: PhysicalType::FIXED_LEN_BYTE_ARRAY,
      type_length: length
    })
  }

  /// Creates a group of `fields`. Field names must be unique and the group must have
  /// at least one field.
  pub fn group(name: &str, repetition: Repetition, fields: Vec<Type>) -> Result<Type> {
    Self::new_group(name, Some(repetition), fields)
  }

  /// Creates a root message type.
  pub fn message(name: &str, fields: Vec<Type>) -> Result<Type> {
    Self::new_group(name, None, fields)
  }

  fn new_group(name: &str, repetition: Option<Repetition>, fields: Vec<Type>) -> Result<Type> {
    if fields.is_empty() {
      return Err(schema_err!("Group '{}' must have at least one field", name));
    }
    let mut names = HashSet::new();
    for f in fields.iter() {
      if !names.insert(f.name().to_owned()) {
        return Err(schema_err!("Duplicate field '{}' in group '{}'", f.name(), name));
      }
    }
    Ok(Type::GroupType {
      basic_info: BasicTypeInfo { name: String::from(name), repetition },
      fields: fields.into_iter().map(Arc::new).collect()
    })
  }

  pub fn get_basic_info(&self) -> &BasicTypeInfo {
    match *self {
      Type::PrimitiveType { ref basic_info, .. } => basic_info,
      Type::GroupType { ref basic_info, .. } => basic_info
    }
  }

  pub fn name(&self) -> &str {
    self.get_basic_info().name()
  }

  pub fn repetition(&self) -> Option<Repetition> {
    self.get_basic_info().repetition()
  }

  pub fn is_primitive(&self) -> bool {
    match *self {
      Type::PrimitiveType { .. } => true,
      _ => false
    }
  }

  pub fn is_group(&self) -> bool {
    !self.is_primitive()
  }

  /// Returns `true` if this is the root (message) type.
  pub fn is_schema(&self) -> bool {
    self.is_group() && self.repetition().is_none()
  }

  /// Returns this group's fields. Empty for primitive types.
  pub fn get_fields(&self) -> &[TypePtr] {
    match *self {
      Type::GroupType { ref fields, .. } => fields,
      Type::PrimitiveType { .. } => &[]
    }
  }

  /// Returns the physical type of a primitive type, `None` for groups.
  pub fn get_physical_type(&self) -> Option<PhysicalType> {
    match *self {
      Type::PrimitiveType { physical_type, .. } => Some(physical_type),
      Type::GroupType { .. } => None
    }
  }
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let mut printer = Printer { output: f, indent: 0 };
    printer.print(self)
  }
}

const INDENT_WIDTH: usize = 2;

struct Printer<'a, 'b: 'a> {
  output: &'a mut fmt::Formatter<'b>,
  indent: usize
}

impl<'a, 'b> Printer<'a, 'b> {
  fn print(&mut self, tp: &Type) -> fmt::Result {
    write!(self.output, "{:width$}", "", width = self.indent)?;
    match *tp {
      Type::PrimitiveType { ref basic_info, physical_type, type_length } => {
        let repetition = basic_info.repetition().unwrap_or(Repetition::REQUIRED);
        if physical_type == PhysicalType::FIXED_LEN_BYTE_ARRAY {
          write!(
            self.output, "{} {}({}) {};", repetition, physical_type, type_length, basic_info.name()
          )
        } else {
          write!(self.output, "{} {} {};", repetition, physical_type, basic_info.name())
        }
      },
      Type::GroupType { ref basic_info, ref fields } => {
        match basic_info.repetition() {
          None => writeln!(self.output, "message {} {{", basic_info.name())?,
          Some(r) => writeln!(self.output, "{} group {} {{", r, basic_info.name())?
        }
        self.indent += INDENT_WIDTH;
        for c in fields {
          self.print(c)?;
          writeln!(self.output)?;
        }
        self.indent -= INDENT_WIDTH;
        write!(self.output, "{:width$}}}", "", width = self.indent)
      }
    }
  }
}

// ----------------------------------------------------------------------
// Column paths and descriptors

/// Represents a path in a nested schema, from the root down to a leaf.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnPath {
  parts: Vec<String>
}

impl ColumnPath {
  pub fn new(parts: Vec<String>) -> Self {
    ColumnPath { parts }
  }

  /// Returns string representation of this column path, parts joined with dots.
  pub fn string(&self) -> String {
    self.parts.join(".")
  }

  pub fn parts(&self) -> &[String] {
    &self.parts
  }
}

impl fmt::Display for ColumnPath {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.string())
  }
}

/// A descriptor for leaf-level primitive columns. Holds the leaf's stable index, its
/// path and the maximum definition and repetition levels along that path.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDescriptor {
  column_index: u16,
  primitive_type: TypePtr,
  path: ColumnPath,
  max_def_level: u8,
  max_rep_level: u8
}

impl ColumnDescriptor {
  pub fn new(
    column_index: u16,
    primitive_type: TypePtr,
    path: ColumnPath,
    max_def_level: u8,
    max_rep_level: u8
  ) -> Self {
    Self { column_index, primitive_type, path, max_def_level, max_rep_level }
  }

  pub fn column_index(&self) -> u16 {
    self.column_index
  }

  pub fn max_def_level(&self) -> u8 {
    self.max_def_level
  }

  pub fn max_rep_level(&self) -> u8 {
    self.max_rep_level
  }

  pub fn path(&self) -> &ColumnPath {
    &self.path
  }

  pub fn name(&self) -> &str {
    self.primitive_type.name()
  }

  pub fn self_type(&self) -> &Type {
    &self.primitive_type
  }

  pub fn physical_type(&self) -> PhysicalType {
    match *self.primitive_type {
      Type::PrimitiveType { physical_type, .. } => physical_type,
      Type::GroupType { .. } => unreachable!("column descriptor built from a group type")
    }
  }

  /// Returns the byte width of `FIXED_LEN_BYTE_ARRAY` values, -1 for other types.
  pub fn type_length(&self) -> i32 {
    match *self.primitive_type {
      Type::PrimitiveType { type_length, .. } => type_length,
      Type::GroupType { .. } => -1
    }
  }
}

/// Schema of a Parquet file: the root message type plus its flattened leaf columns.
#[derive(Debug, PartialEq)]
pub struct SchemaDescriptor {
  schema: TypePtr,
  leaves: Vec<ColumnDescPtr>
}

impl SchemaDescriptor {
  /// Builds the descriptor for the root message type `tp`, assigning leaf column
  /// indices depth-first.
  pub fn new(tp: TypePtr) -> Result<Self> {
    if !tp.is_schema() {
      return Err(schema_err!("SchemaDescriptor should take a message type, got '{}'", tp.name()));
    }
    let mut leaves = vec![];
    for f in tp.get_fields() {
      let mut path = vec![];
      build_tree(f, 0, 0, &mut leaves, &mut path)?;
    }
    Ok(Self { schema: tp, leaves })
  }

  pub fn num_columns(&self) -> usize {
    self.leaves.len()
  }

  /// Returns column descriptor for the `i`th leaf column. Panics if out of bound.
  pub fn column(&self, i: usize) -> ColumnDescPtr {
    assert!(
      i < self.leaves.len(),
      "Index out of bound: {} not in [0, {})", i, self.leaves.len()
    );
    self.leaves[i].clone()
  }

  pub fn columns(&self) -> &[ColumnDescPtr] {
    &self.leaves
  }

  pub fn root_schema(&self) -> &Type {
    &self.schema
  }

  pub fn root_schema_ptr(&self) -> TypePtr {
    self.schema.clone()
  }

  pub fn name(&self) -> &str {
    self.schema.name()
  }
}

impl fmt::Display for SchemaDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.schema)
  }
}

fn build_tree(
  tp: &TypePtr,
  mut max_rep_level: u8,
  mut max_def_level: u8,
  leaves: &mut Vec<ColumnDescPtr>,
  path_so_far: &mut Vec<String>
) -> Result<()> {
  path_so_far.push(String::from(tp.name()));
  match tp.repetition() {
    Some(Repetition::OPTIONAL) => {
      max_def_level = next_level(max_def_level, tp)?;
    },
    Some(Repetition::REPEATED) => {
      max_def_level = next_level(max_def_level, tp)?;
      max_rep_level = next_level(max_rep_level, tp)?;
    },
    _ => {}
  }

  match **tp {
    Type::PrimitiveType { .. } => {
      if leaves.len() > u16::max_value() as usize {
        return Err(schema_err!("Too many leaf columns, at most {} allowed", u16::max_value()));
      }
      let path = ColumnPath::new(path_so_far.clone());
      leaves.push(Arc::new(ColumnDescriptor::new(
        leaves.len() as u16, tp.clone(), path, max_def_level, max_rep_level
      )));
    },
    Type::GroupType { ref fields, .. } => {
      for f in fields {
        build_tree(f, max_rep_level, max_def_level, leaves, path_so_far)?;
      }
    }
  }
  path_so_far.pop();
  Ok(())
}

fn next_level(level: u8, tp: &Type) -> Result<u8> {
  level.checked_add(1).ok_or_else(|| schema_err!("Field '{}' is nested too deeply", tp.name()))
}

// ----------------------------------------------------------------------
// Flattened schema elements, as stored in the file footer

/// One node of the schema tree in depth-first order. Groups carry their number of
/// children, primitives their physical type.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaElement {
  pub name: String,
  pub repetition: Option<Repetition>,
  pub physical_type: Option<PhysicalType>,
  pub type_length: i32,
  pub num_children: u32
}

/// Flattens the schema tree rooted at `tp` into depth-first schema elements.
pub fn to_schema_elements(tp: &Type) -> Vec<SchemaElement> {
  let mut elements = vec![];
  to_schema_elements_helper(tp, &mut elements);
  elements
}

fn to_schema_elements_helper(tp: &Type, elements: &mut Vec<SchemaElement>) {
  match *tp {
    Type::PrimitiveType { ref basic_info, physical_type, type_length } => {
      elements.push(SchemaElement {
        name: basic_info.name().to_owned(),
        repetition: basic_info.repetition(),
        physical_type: Some(physical_type),
        type_length,
        num_children: 0
      });
    },
    Type::GroupType { ref basic_info, ref fields } => {
      elements.push(SchemaElement {
        name: basic_info.name().to_owned(),
        repetition: basic_info.repetition(),
        physical_type: None,
        type_length: -1,
        num_children: fields.len() as u32
      });
      for f in fields {
        to_schema_elements_helper(f, elements);
      }
    }
  }
}

/// Rebuilds the schema tree from depth-first schema elements.
pub fn from_schema_elements(elements: &[SchemaElement]) -> Result<TypePtr> {
  if elements.is_empty() {
    return Err(schema_err!("Expected exactly one root node, but found none"));
  }
  let (next, root) = from_schema_elements_helper(elements, 0)?;
  if next != elements.len() {
    return Err(schema_err!(
      "Expected exactly one root node, but found {} trailing elements", elements.len() - next
    ));
  }
  Ok(Arc::new(root))
}

/// Constructs a new Type from the `elements`, starting at index `index`.
/// The first result is the starting index for the next Type after this one.
fn from_schema_elements_helper(elements: &[SchemaElement], index: usize) -> Result<(usize, Type)> {
  if index >= elements.len() {
    return Err(schema_err!("Index out of bound, index = {}, len = {}", index, elements.len()));
  }
  let element = &elements[index];
  match element.physical_type {
    Some(physical_type) => {
      let repetition = element.repetition
        .ok_or_else(|| schema_err!("Repetition must be defined for primitive '{}'", element.name))?;
      let result = if physical_type == PhysicalType::FIXED_LEN_BYTE_ARRAY {
        Type::fixed_len_byte_array(&element.name, repetition, element.type_length)?
      } else {
        Type::primitive(&element.name, repetition, physical_type)?
      };
      Ok((index + 1, result))
    },
    None => {
      let mut fields = vec![];
      let mut next_index = index + 1;
      for _ in 0..element.num_children {
        let (next, child) = from_schema_elements_helper(elements, next_index)?;
        next_index = next;
        fields.push(child);
      }
      let result = Type::new_group(&element.name, element.repetition, fields)?;
      Ok((next_index, result))
    }
  }
}
