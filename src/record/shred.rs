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

//! Record shredding and assembly.
//!
//! `deconstruct` walks a [`Record`] along the schema tree and emits, for every leaf
//! column, the values of that column tagged with repetition and definition levels.
//! Absent optional fields and empty repeated fields still produce one null value per
//! leaf beneath them, so every column advances by at least one slot per record.
//! `reconstruct` is the inverse: it splits each column's values at repetition
//! boundaries and uses definition levels to tell nulls and empty lists apart.

use crate::basic::Repetition;
use crate::errors::{ParquetError, Result};
use crate::record::api::{make_list, make_record, Field, Record};
use crate::schema::types::{SchemaDescriptor, Type};
use crate::value::{split_columns, Row, Value};

impl SchemaDescriptor {
  /// Appends the shredded values of `record` to `dst`, grouped by column in leaf order,
  /// including explicit nulls. Fields of `record` are matched to schema fields by name:
  /// a missing field is treated as null, or as an empty list if it is repeated, and a
  /// field the schema does not know is an error.
  pub fn deconstruct(&self, dst: &mut Row, record: &Record) -> Result<()> {
    let mut columns: Vec<Vec<Value>> = vec![vec![]; self.num_columns()];
    let mut shredder = Shredder { columns: &mut columns };
    shredder.shred_group(self.root_schema(), record, 0, 0, 0, 0)?;
    for column in columns {
      dst.extend(column);
    }
    Ok(())
  }

  /// Rebuilds the record that `row` was shredded from. Fails if the row does not
  /// cover every leaf column, references an unknown column, or its levels do not
  /// describe a valid record for this schema.
  pub fn reconstruct(&self, row: &[Value]) -> Result<Record> {
    let num_columns = self.num_columns();
    let columns = split_columns(row, num_columns).map_err(|pos| {
      general_err!(
        "Value {} of row references column {} out of order or unknown ({} columns)",
        pos, row[pos].column_index(), num_columns
      )
    })?;
    if columns.len() != num_columns {
      return Err(general_err!("Row has no value for column {}", columns.len()));
    }
    for (i, column) in columns.iter().enumerate() {
      if column[0].repetition_level() != 0 {
        return Err(general_err!(
          "Row must start with repetition level 0 in column {}, got {}",
          i, column[0].repetition_level()
        ));
      }
    }
    match assemble_present(self.root_schema(), &columns, 0, 0)? {
      Field::Group(record) => Ok(record),
      _ => Err(general_err!("Root schema must be a group"))
    }
  }
}

/// Returns the number of leaf columns under `tp`.
fn num_leaves(tp: &Type) -> usize {
  match *tp {
    Type::PrimitiveType { .. } => 1,
    Type::GroupType { ref fields, .. } => fields.iter().map(|f| num_leaves(f)).sum()
  }
}

struct Shredder<'a> {
  columns: &'a mut Vec<Vec<Value>>
}

impl<'a> Shredder<'a> {
  /// Shreds `field` as an instance of `tp`. `rep` is the repetition level of the first
  /// value emitted, `def` the definition level reached by the parent, `depth` the
  /// parent's maximum repetition level.
  fn shred(
    &mut self,
    tp: &Type,
    field: &Field,
    first_leaf: usize,
    rep: u8,
    def: u8,
    depth: u8
  ) -> Result<()> {
    match tp.repetition() {
      Some(Repetition::OPTIONAL) => {
        if *field == Field::Null {
          self.emit_nulls(tp, first_leaf, rep, def);
          Ok(())
        } else {
          self.shred_present(tp, field, first_leaf, rep, def + 1, depth)
        }
      },
      Some(Repetition::REPEATED) => {
        let elements = match *field {
          Field::List(ref list) => list.elements(),
          ref other => {
            return Err(general_err!("Repeated field '{}' expects a list, got {}", tp.name(), other))
          }
        };
        if elements.is_empty() {
          self.emit_nulls(tp, first_leaf, rep, def);
          return Ok(());
        }
        for (i, element) in elements.iter().enumerate() {
          if *element == Field::Null {
            return Err(general_err!("Repeated field '{}' cannot hold null elements", tp.name()));
          }
          let element_rep = if i == 0 { rep } else { depth + 1 };
          self.shred_present(tp, element, first_leaf, element_rep, def + 1, depth + 1)?;
        }
        Ok(())
      },
      _ => {
        if *field == Field::Null {
          return Err(general_err!("Required field '{}' is null", tp.name()));
        }
        self.shred_present(tp, field, first_leaf, rep, def, depth)
      }
    }
  }

  fn shred_present(
    &mut self,
    tp: &Type,
    field: &Field,
    first_leaf: usize,
    rep: u8,
    def: u8,
    depth: u8
  ) -> Result<()> {
    match *tp {
      Type::PrimitiveType { physical_type, type_length, .. } => {
        let kind = field.to_value_kind(physical_type, type_length)
          .map_err(|e| general_err!("Field '{}': {}", tp.name(), e))?;
        self.columns[first_leaf].push(Value::new(kind, first_leaf as u16, rep, def));
        Ok(())
      },
      Type::GroupType { .. } => {
        match *field {
          Field::Group(ref record) => self.shred_group(tp, record, first_leaf, rep, def, depth),
          ref other => Err(general_err!("Group field '{}' expects a group, got {}", tp.name(), other))
        }
      }
    }
  }

  fn shred_group(
    &mut self,
    tp: &Type,
    record: &Record,
    first_leaf: usize,
    rep: u8,
    def: u8,
    depth: u8
  ) -> Result<()> {
    for &(ref name, _) in record.fields() {
      if !tp.get_fields().iter().any(|child| child.name() == name) {
        return Err(general_err!("Field '{}' is not part of group '{}'", name, tp.name()));
      }
    }
    let mut leaf = first_leaf;
    for child in tp.get_fields() {
      match record.get(child.name()) {
        Some(field) => self.shred(child, field, leaf, rep, def, depth)?,
        None if child.repetition() == Some(Repetition::REPEATED) => {
          self.emit_nulls(child, leaf, rep, def)
        },
        None => self.shred(child, &Field::Null, leaf, rep, def, depth)?
      }
      leaf += num_leaves(child);
    }
    Ok(())
  }

  fn emit_nulls(&mut self, tp: &Type, first_leaf: usize, rep: u8, def: u8) {
    for leaf in first_leaf..first_leaf + num_leaves(tp) {
      self.columns[leaf].push(Value::null(leaf as u16, rep, def));
    }
  }
}

/// Assembles the instance of `tp` described by `columns`, one value run per leaf under
/// `tp`. `def` is the definition level reached by the parent and `depth` the parent's
/// maximum repetition level.
fn assemble(tp: &Type, columns: &[&[Value]], def: u8, depth: u8) -> Result<Field> {
  let first = first_value(tp, columns)?;
  match tp.repetition() {
    Some(Repetition::OPTIONAL) => {
      if first.definition_level() <= def {
        Ok(Field::Null)
      } else {
        assemble_present(tp, columns, def + 1, depth)
      }
    },
    Some(Repetition::REPEATED) => {
      if first.definition_level() <= def {
        return Ok(Field::List(make_list(vec![])));
      }
      let split: Vec<Vec<&[Value]>> = columns.iter()
        .map(|column| split_elements(column, depth + 1))
        .collect();
      let num_elements = split[0].len();
      if split.iter().any(|elements| elements.len() != num_elements) {
        return Err(general_err!(
          "Columns under repeated field '{}' disagree on the number of elements", tp.name()
        ));
      }
      let mut elements = Vec::with_capacity(num_elements);
      for i in 0..num_elements {
        let element_columns: Vec<&[Value]> = split.iter().map(|elements| elements[i]).collect();
        elements.push(assemble_present(tp, &element_columns, def + 1, depth + 1)?);
      }
      Ok(Field::List(make_list(elements)))
    },
    _ => assemble_present(tp, columns, def, depth)
  }
}

fn assemble_present(tp: &Type, columns: &[&[Value]], def: u8, depth: u8) -> Result<Field> {
  match *tp {
    Type::PrimitiveType { .. } => {
      let value = first_value(tp, columns)?;
      if columns[0].len() != 1 {
        return Err(general_err!(
          "Expected one value for field '{}', got {}", tp.name(), columns[0].len()
        ));
      }
      if value.is_null() || value.definition_level() != def {
        return Err(general_err!(
          "Unexpected null or definition level {} for field '{}' defined at level {}",
          value.definition_level(), tp.name(), def
        ));
      }
      Ok(Field::from_value_kind(value.kind().clone()))
    },
    Type::GroupType { ref fields, .. } => {
      let mut result = Vec::with_capacity(fields.len());
      let mut leaf = 0;
      for child in fields {
        let n = num_leaves(child);
        let field = assemble(child, &columns[leaf..leaf + n], def, depth)?;
        result.push((child.name().to_owned(), field));
        leaf += n;
      }
      Ok(Field::Group(make_record(result)))
    }
  }
}

fn first_value<'a>(tp: &Type, columns: &[&'a [Value]]) -> Result<&'a Value> {
  columns.first()
    .and_then(|column| column.first())
    .ok_or_else(|| general_err!("No value for field '{}'", tp.name()))
}

/// Splits a run of values into list elements. A value with repetition level at most
/// `level` starts a new element.
fn split_elements(values: &[Value], level: u8) -> Vec<&[Value]> {
  let mut elements = vec![];
  let mut start = 0;
  for i in 1..values.len() {
    if values[i].repetition_level() <= level {
      elements.push(&values[start..i]);
      start = i;
    }
  }
  if start < values.len() {
    elements.push(&values[start..]);
  }
  elements
}
