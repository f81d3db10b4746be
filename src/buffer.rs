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

//! In-memory row group: one column buffer per leaf column of a schema, written a row
//! at a time, and the row reader shared with file row groups.

use std::borrow::Cow;

use tracing::trace;

use crate::column::buffer::ColumnBuffer;
use crate::column::page::{LevelCursor, Page, PageReader};
use crate::errors::{ParquetError, Result};
use crate::record::api::Record;
use crate::schema::types::SchemaDescPtr;
use crate::value::{split_columns, Row, Value};

/// Buffers rows of a schema column by column.
///
/// Writing a row appends to every column buffer or to none, and advances the row count
/// shared by all columns.
pub struct Buffer {
  schema: SchemaDescPtr,
  columns: Vec<ColumnBuffer>,
  num_rows: usize
}

impl Buffer {
  pub fn new(schema: SchemaDescPtr) -> Self {
    let columns = schema.columns().iter().map(|c| ColumnBuffer::new(c.clone())).collect();
    Self { schema, columns, num_rows: 0 }
  }

  pub fn schema(&self) -> &SchemaDescPtr {
    &self.schema
  }

  /// Number of rows written to this buffer.
  pub fn num_rows(&self) -> usize {
    self.num_rows
  }

  pub fn num_columns(&self) -> usize {
    self.columns.len()
  }

  /// Returns the buffer of the `i`th leaf column.
  pub fn column(&self, i: usize) -> &ColumnBuffer {
    &self.columns[i]
  }

  pub fn columns(&self) -> &[ColumnBuffer] {
    &self.columns
  }

  #[cfg(test)]
  pub(crate) fn column_mut(&mut self, i: usize) -> &mut ColumnBuffer {
    &mut self.columns[i]
  }

  /// Checks that every column holds the number of rows written to the buffer.
  pub fn check_aligned(&self) -> Result<()> {
    let num_rows = self.num_rows;
    for column in &self.columns {
      if column.num_rows() != num_rows {
        return Err(general_err!(
          "Column '{}' has {} rows, expected {}",
          column.column_descr().path(), column.num_rows(), num_rows
        ));
      }
    }
    Ok(())
  }

  /// Writes one shredded row: the values of every leaf column, grouped by column in
  /// leaf order. Fails without writing anything if the row misses a column,
  /// references an unknown column, or has invalid values for a column.
  pub fn write_row(&mut self, row: &[Value]) -> Result<()> {
    let num_columns = self.columns.len();
    let parts = split_columns(row, num_columns).map_err(|pos| {
      general_err!(
        "Value {} of row references column {} out of order or unknown ({} columns)",
        pos, row[pos].column_index(), num_columns
      )
    })?;
    if parts.len() != num_columns {
      return Err(general_err!(
        "Row has no value for column '{}'", self.columns[parts.len()].column_descr().path()
      ));
    }
    for (column, values) in self.columns.iter().zip(parts.iter()) {
      column.check_row(values)?;
    }
    for (column, values) in self.columns.iter_mut().zip(parts.iter()) {
      column.append_row(values)?;
    }
    self.num_rows += 1;
    trace!(num_values = row.len(), num_rows = self.num_rows(), "wrote row");
    Ok(())
  }

  /// Shreds `record` and writes it as one row.
  pub fn write_record(&mut self, record: &Record) -> Result<()> {
    let mut row = Vec::with_capacity(self.columns.len());
    self.schema.deconstruct(&mut row, record)?;
    self.write_row(&row)
  }

  /// Returns a reader over the rows buffered so far.
  pub fn rows(&self) -> RowReader {
    let pages = self.columns.iter().map(|c| c.page()).collect();
    RowReader::from_pages(self.schema.clone(), pages)
  }

  /// Removes every buffered row.
  pub fn reset(&mut self) {
    for column in self.columns.iter_mut() {
      column.reset();
    }
    self.num_rows = 0;
  }
}

// ----------------------------------------------------------------------
// Row reader

/// Position in the pages of one column.
struct ColumnCursor<'a> {
  page: Option<Cow<'a, Page>>,
  cursor: LevelCursor,
  pages: Option<Box<dyn PageReader + 'a>>
}

impl<'a> ColumnCursor<'a> {
  /// Appends the values of the next row to `dst`. Returns `false` if the column has no
  /// rows left.
  fn read_row(&mut self, dst: &mut Row) -> Result<bool> {
    loop {
      if let Some(ref page) = self.page {
        if !self.cursor.is_exhausted(page) {
          self.cursor.read_row(page, dst)?;
          return Ok(true);
        }
      }
      let next = match self.pages {
        Some(ref mut pages) => pages.get_next_page()?,
        None => return Ok(false)
      };
      match next {
        Some(page) => {
          self.page = Some(Cow::Owned(page));
          self.cursor = LevelCursor::default();
        },
        None => {
          self.page = None;
          self.pages = None;
        }
      }
    }
  }
}

/// Reads rows back from the columns of a row group, in memory or in a file, taking
/// the next row of every column and joining them in leaf order.
///
/// Once every row has been read, [`RowReader::read_row`] fails with
/// [`ParquetError::EOF`] on every call. As an iterator, the reader ends instead.
pub struct RowReader<'a> {
  schema: SchemaDescPtr,
  columns: Vec<ColumnCursor<'a>>,
  num_rows_read: usize,
  exhausted: bool
}

impl<'a> RowReader<'a> {
  pub(crate) fn from_pages(schema: SchemaDescPtr, pages: Vec<&'a Page>) -> Self {
    let columns = pages
      .into_iter()
      .map(|page| ColumnCursor {
        page: Some(Cow::Borrowed(page)),
        cursor: LevelCursor::default(),
        pages: None
      })
      .collect();
    Self { schema, columns, num_rows_read: 0, exhausted: false }
  }

  pub(crate) fn from_page_readers(
    schema: SchemaDescPtr,
    readers: Vec<Box<dyn PageReader + 'a>>
  ) -> Self {
    let columns = readers
      .into_iter()
      .map(|reader| ColumnCursor {
        page: None,
        cursor: LevelCursor::default(),
        pages: Some(reader)
      })
      .collect();
    Self { schema, columns, num_rows_read: 0, exhausted: false }
  }

  pub fn schema(&self) -> &SchemaDescPtr {
    &self.schema
  }

  /// Number of rows read so far.
  pub fn num_rows_read(&self) -> usize {
    self.num_rows_read
  }

  /// Replaces the content of `dst` with the values of the next row.
  pub fn read_row(&mut self, dst: &mut Row) -> Result<()> {
    dst.clear();
    if self.exhausted {
      return Err(eof_err!("No more rows"));
    }
    let mut has_row = None;
    for (i, column) in self.columns.iter_mut().enumerate() {
      let read = column.read_row(dst)?;
      match has_row {
        None => has_row = Some(read),
        Some(expected) if expected != read => {
          dst.clear();
          return Err(general_err!(
            "Column {} ends {} the other columns after {} rows",
            i, if read { "after" } else { "before" }, self.num_rows_read
          ));
        },
        Some(_) => {}
      }
    }
    if has_row != Some(true) {
      self.exhausted = true;
      return Err(eof_err!("No more rows"));
    }
    self.num_rows_read += 1;
    Ok(())
  }

  /// Reads the next row and rebuilds the record it was shredded from.
  pub fn read_record(&mut self) -> Result<Record> {
    let mut row = Vec::with_capacity(self.columns.len());
    self.read_row(&mut row)?;
    self.schema.reconstruct(&row)
  }
}

impl<'a> Iterator for RowReader<'a> {
  type Item = Result<Row>;

  fn next(&mut self) -> Option<Self::Item> {
    let mut row = Vec::with_capacity(self.columns.len());
    match self.read_row(&mut row) {
      Ok(()) => Some(Ok(row)),
      Err(ref e) if e.is_eof() => None,
      Err(e) => Some(Err(e))
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use crate::basic::{Repetition, Type as PhysicalType};
  use crate::data_type::ByteArray;
  use crate::record::api::{make_list, make_record, Field};
  use crate::schema::types::{SchemaDescriptor, Type};
  use crate::value::ValueKind;

  fn schema(fields: Vec<Type>) -> SchemaDescPtr {
    Arc::new(SchemaDescriptor::new(Arc::new(Type::message("schema", fields).unwrap())).unwrap())
  }

  fn record(fields: Vec<(&str, Field)>) -> Record {
    make_record(fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
  }

  fn read_all(buffer: &Buffer) -> Vec<Row> {
    buffer.rows().collect::<Result<Vec<_>>>().unwrap()
  }

  #[test]
  fn test_trailing_nulls_are_kept() {
    let mut buffer = Buffer::new(schema(vec![
      Type::primitive("name", Repetition::OPTIONAL, PhysicalType::BYTE_ARRAY).unwrap()
    ]));
    let records = vec![
      record(vec![("name", Field::Null)]),
      record(vec![("name", Field::from("test"))]),
      record(vec![("name", Field::Null)])
    ];
    for r in &records {
      buffer.write_record(r).unwrap();
    }
    assert_eq!(buffer.num_rows(), 3);

    let mut rows = buffer.rows();
    for r in &records {
      assert_eq!(&rows.read_record().unwrap(), r);
    }
    assert!(rows.read_record().unwrap_err().is_eof());
    assert_eq!(rows.num_rows_read(), 3);
  }

  #[test]
  fn test_empty_lists_are_kept() {
    let mut buffer = Buffer::new(schema(vec![
      Type::primitive("names", Repetition::REPEATED, PhysicalType::BYTE_ARRAY).unwrap()
    ]));
    let records = vec![
      record(vec![("names", Field::List(make_list(vec![])))]),
      record(vec![("names", Field::List(make_list(vec![Field::from("test")])))]),
      record(vec![("names", Field::List(make_list(vec![])))])
    ];
    for r in &records {
      buffer.write_record(r).unwrap();
    }
    assert_eq!(buffer.num_rows(), 3);
    let read: Vec<Record> = (0..3).scan(buffer.rows(), |rows, _| rows.read_record().ok()).collect();
    assert_eq!(read, records);
  }

  #[test]
  fn test_null_keeps_column_index() {
    let mut buffer = Buffer::new(schema(vec![
      Type::primitive("value", Repetition::OPTIONAL, PhysicalType::INT32).unwrap()
    ]));
    buffer.write_record(&record(vec![("value", Field::Null)])).unwrap();
    let rows = read_all(&buffer);
    assert_eq!(rows, vec![vec![Value::null(0, 0, 0)]]);
    assert_eq!(rows[0][0].column_index(), 0);
  }

  #[test]
  fn test_write_row_is_atomic() {
    let mut buffer = Buffer::new(schema(vec![
      Type::primitive("a", Repetition::REQUIRED, PhysicalType::INT32).unwrap(),
      Type::primitive("b", Repetition::REQUIRED, PhysicalType::INT64).unwrap()
    ]));
    // Second column has the wrong type
    let row = vec![Value::int32(1), Value::int32(2).with_column_index(1)];
    assert!(buffer.write_row(&row).is_err());
    // Missing column
    assert!(buffer.write_row(&[Value::int32(1)]).is_err());
    // Unknown column
    let row = vec![
      Value::int32(1), Value::int64(2).with_column_index(1), Value::int64(3).with_column_index(2)
    ];
    assert!(buffer.write_row(&row).is_err());
    // Out of order
    let row = vec![Value::int64(2).with_column_index(1), Value::int32(1)];
    assert!(buffer.write_row(&row).is_err());
    assert_eq!(buffer.num_rows(), 0);
    assert_eq!(buffer.column(0).num_values(), 0);

    buffer.write_row(&[Value::int32(1), Value::int64(2).with_column_index(1)]).unwrap();
    assert_eq!(buffer.num_rows(), 1);
    assert_eq!(buffer.column(1).num_rows(), 1);
  }

  #[test]
  fn test_rows_exhaustion_is_sticky() {
    let mut buffer = Buffer::new(schema(vec![
      Type::primitive("a", Repetition::REQUIRED, PhysicalType::DOUBLE).unwrap()
    ]));
    buffer.write_row(&[Value::double(1.5)]).unwrap();
    let mut rows = buffer.rows();
    let mut row = vec![];
    rows.read_row(&mut row).unwrap();
    assert_eq!(row, vec![Value::double(1.5)]);
    for _ in 0..3 {
      assert!(rows.read_row(&mut row).unwrap_err().is_eof());
      assert!(row.is_empty());
    }
    assert!(rows.next().is_none());
  }

  #[test]
  fn test_empty_buffer_has_no_rows() {
    let buffer = Buffer::new(schema(vec![
      Type::primitive("a", Repetition::OPTIONAL, PhysicalType::BOOLEAN).unwrap()
    ]));
    assert_eq!(buffer.num_rows(), 0);
    assert!(buffer.rows().read_row(&mut vec![]).unwrap_err().is_eof());
  }

  #[test]
  fn test_misaligned_columns() {
    let mut buffer = Buffer::new(schema(vec![
      Type::primitive("a", Repetition::REQUIRED, PhysicalType::INT32).unwrap(),
      Type::primitive("b", Repetition::REQUIRED, PhysicalType::INT32).unwrap()
    ]));
    buffer.column_mut(0).write_int32s(&[1, 2]).unwrap();
    buffer.column_mut(1).write_int32s(&[3]).unwrap();
    assert_eq!(buffer.num_rows(), 0);
    assert!(buffer.check_aligned().is_err());

    let mut rows = buffer.rows();
    let mut row = vec![];
    rows.read_row(&mut row).unwrap();
    assert_eq!(row, vec![Value::int32(1), Value::int32(3).with_column_index(1)]);
    let err = rows.read_row(&mut row).unwrap_err();
    assert!(!err.is_eof());
  }

  #[test]
  fn test_nested_records() {
    let mut buffer = Buffer::new(schema(vec![
      Type::primitive("id", Repetition::REQUIRED, PhysicalType::INT64).unwrap(),
      Type::group("tags", Repetition::REPEATED, vec![
        Type::primitive("key", Repetition::REQUIRED, PhysicalType::BYTE_ARRAY).unwrap(),
        Type::primitive("value", Repetition::OPTIONAL, PhysicalType::BYTE_ARRAY).unwrap()
      ]).unwrap()
    ]));
    let tag = |k: &str, v: Field| Field::Group(record(vec![("key", Field::from(k)), ("value", v)]));
    let records = vec![
      record(vec![
        ("id", Field::Long(1)),
        ("tags", Field::List(make_list(vec![tag("a", Field::from("x")), tag("b", Field::Null)])))
      ]),
      record(vec![("id", Field::Long(2)), ("tags", Field::List(make_list(vec![])))])
    ];
    for r in &records {
      buffer.write_record(r).unwrap();
    }
    assert_eq!(buffer.num_rows(), 2);
    assert_eq!(buffer.column(1).page().rep_levels(), &[0, 1, 0]);
    assert_eq!(buffer.column(2).page().def_levels(), &[2, 1, 0]);

    let rows = read_all(&buffer);
    assert_eq!(rows.len(), 2);
    assert_eq!(*rows[0][1].kind(), ValueKind::ByteArray(ByteArray::from("a")));
    let mut reader = buffer.rows();
    assert_eq!(reader.read_record().unwrap(), records[0]);
    assert_eq!(reader.read_record().unwrap(), records[1]);
  }

  #[test]
  fn test_reset() {
    let mut buffer = Buffer::new(schema(vec![
      Type::primitive("a", Repetition::REQUIRED, PhysicalType::INT32).unwrap()
    ]));
    buffer.write_row(&[Value::int32(1)]).unwrap();
    buffer.reset();
    assert_eq!(buffer.num_rows(), 0);
    buffer.write_row(&[Value::int32(2)]).unwrap();
    assert_eq!(read_all(&buffer), vec![vec![Value::int32(2)]]);
  }
}
