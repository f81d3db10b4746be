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

//! Contains information about available Parquet metadata.
//!
//! The hierarchy of metadata is as follows:
//!
//! [`ParquetMetaData`] contains [`FileMetaData`] and zero or more [`RowGroupMetaData`]
//! for each row group.
//!
//! [`FileMetaData`] includes file version, application specific metadata.
//!
//! Each [`RowGroupMetaData`] contains information about row group and one or more
//! [`ColumnChunkMetaData`] for each column chunk.
//!
//! The module also contains the binary layout of the footer and of page headers,
//! all integers little-endian:
//!
//! ```text
//! footer      := num_rows:u64 created_by:str num_elements:u32 element*
//!                num_row_groups:u32 row_group*
//! element     := name:str repetition:u8 physical_type:u8 type_length:i32
//!                num_children:u32
//! row_group   := num_rows:u64 total_byte_size:u64 num_columns:u32 column_chunk*
//! column_chunk := column_index:u16 physical_type:u8 compression:u8 encoding:u8
//!                 num_values:u64 num_pages:u32 data_page_offset:u64
//!                 total_compressed_size:u64 total_uncompressed_size:u64
//! str         := len:u32 bytes
//! page_header := uncompressed_size:u32 compressed_size:u32 num_values:u32
//!                num_nulls:u32 num_rows:u32 encoding:u8
//! ```
//!
//! Absent repetition or physical type of a schema element is stored as `0xFF`.

use std::convert::TryFrom;
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::basic::{Compression, Encoding, Repetition, Type};
use crate::errors::{ParquetError, Result};
use crate::schema::types::{
  from_schema_elements, to_schema_elements, ColumnDescPtr, ColumnPath, SchemaDescPtr,
  SchemaDescriptor, SchemaElement, TypePtr
};

const ABSENT: u8 = 0xFF;

/// Reference counted pointer for [`RowGroupMetaData`].
pub type RowGroupMetaDataPtr = Arc<RowGroupMetaData>;

/// Global Parquet metadata.
#[derive(Debug)]
pub struct ParquetMetaData {
  file_metadata: FileMetaData,
  row_groups: Vec<RowGroupMetaDataPtr>
}

impl ParquetMetaData {
  pub fn new(file_metadata: FileMetaData, row_groups: Vec<RowGroupMetaDataPtr>) -> Self {
    ParquetMetaData { file_metadata, row_groups }
  }

  pub fn file_metadata(&self) -> &FileMetaData {
    &self.file_metadata
  }

  pub fn num_row_groups(&self) -> usize {
    self.row_groups.len()
  }

  /// Returns row group metadata for `i`th position.
  /// Position should be less than number of row groups `num_row_groups`.
  pub fn row_group(&self, i: usize) -> &RowGroupMetaData {
    &self.row_groups[i]
  }

  pub fn row_groups(&self) -> &[RowGroupMetaDataPtr] {
    &self.row_groups
  }

  /// Serializes the footer of a file with this metadata.
  pub fn write_footer<W: Write>(&self, sink: &mut W) -> Result<()> {
    let file = &self.file_metadata;
    sink.write_u64::<LittleEndian>(file.num_rows as u64)?;
    write_str(sink, &file.created_by)?;
    let elements = to_schema_elements(file.schema());
    sink.write_u32::<LittleEndian>(elements.len() as u32)?;
    for element in &elements {
      write_str(sink, &element.name)?;
      sink.write_u8(element.repetition.map_or(ABSENT, u8::from))?;
      sink.write_u8(element.physical_type.map_or(ABSENT, u8::from))?;
      sink.write_i32::<LittleEndian>(element.type_length)?;
      sink.write_u32::<LittleEndian>(element.num_children)?;
    }
    sink.write_u32::<LittleEndian>(self.row_groups.len() as u32)?;
    for row_group in &self.row_groups {
      row_group.write_to(sink)?;
    }
    Ok(())
  }

  /// Parses a footer written by [`ParquetMetaData::write_footer`].
  pub fn parse_footer(data: &[u8]) -> Result<Self> {
    let mut cursor = Cursor::new(data);
    let metadata = Self::read_footer(&mut cursor).map_err(corrupt_footer)?;
    if cursor.position() as usize != data.len() {
      return Err(general_err!(
        "Invalid footer: {} trailing bytes", data.len() - cursor.position() as usize
      ));
    }
    Ok(metadata)
  }

  fn read_footer(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
    let num_rows = cursor.read_u64::<LittleEndian>()? as i64;
    let created_by = read_str(cursor)?;
    let num_elements = cursor.read_u32::<LittleEndian>()? as usize;
    let mut elements = Vec::with_capacity(num_elements.min(1024));
    for _ in 0..num_elements {
      let name = read_str(cursor)?;
      let repetition = read_optional(cursor.read_u8()?, Repetition::try_from)?;
      let physical_type = read_optional(cursor.read_u8()?, Type::try_from)?;
      let type_length = cursor.read_i32::<LittleEndian>()?;
      let num_children = cursor.read_u32::<LittleEndian>()?;
      elements.push(SchemaElement { name, repetition, physical_type, type_length, num_children });
    }
    let schema = from_schema_elements(&elements)?;
    let schema_descr = Arc::new(SchemaDescriptor::new(schema.clone())?);

    let num_row_groups = cursor.read_u32::<LittleEndian>()? as usize;
    let mut row_groups = Vec::with_capacity(num_row_groups.min(1024));
    for _ in 0..num_row_groups {
      row_groups.push(Arc::new(RowGroupMetaData::read_from(cursor, schema_descr.clone())?));
    }
    let file_metadata = FileMetaData::new(num_rows, created_by, schema, schema_descr);
    Ok(ParquetMetaData::new(file_metadata, row_groups))
  }
}

fn corrupt_footer(e: ParquetError) -> ParquetError {
  match e {
    ParquetError::Io(e) => general_err!("Invalid footer: {}", e),
    e => e
  }
}

fn write_str<W: Write>(sink: &mut W, s: &str) -> io::Result<()> {
  sink.write_u32::<LittleEndian>(s.len() as u32)?;
  sink.write_all(s.as_bytes())
}

fn read_str(cursor: &mut Cursor<&[u8]>) -> Result<String> {
  let len = cursor.read_u32::<LittleEndian>()? as usize;
  let remaining = cursor.get_ref().len() - cursor.position() as usize;
  if len > remaining {
    return Err(general_err!("Invalid footer: string of {} bytes, {} left", len, remaining));
  }
  let mut buf = vec![0; len];
  cursor.read_exact(&mut buf)?;
  String::from_utf8(buf).map_err(|e| general_err!("Invalid footer: {}", e))
}

fn read_optional<T>(b: u8, f: fn(u8) -> Result<T>) -> Result<Option<T>> {
  if b == ABSENT { Ok(None) } else { f(b).map(Some) }
}

/// Metadata for a Parquet file.
#[derive(Debug)]
pub struct FileMetaData {
  num_rows: i64,
  created_by: String,
  schema: TypePtr,
  schema_descr: SchemaDescPtr
}

impl FileMetaData {
  pub fn new(num_rows: i64, created_by: String, schema: TypePtr, schema_descr: SchemaDescPtr) -> Self {
    FileMetaData { num_rows, created_by, schema, schema_descr }
  }

  /// Total number of rows in the file.
  pub fn num_rows(&self) -> i64 {
    self.num_rows
  }

  /// Application that wrote the file.
  pub fn created_by(&self) -> &str {
    &self.created_by
  }

  pub fn schema(&self) -> &crate::schema::types::Type {
    self.schema.as_ref()
  }

  pub fn schema_descr(&self) -> &SchemaDescriptor {
    &self.schema_descr
  }

  pub fn schema_descr_ptr(&self) -> SchemaDescPtr {
    self.schema_descr.clone()
  }
}

/// Metadata for a row group.
#[derive(Debug)]
pub struct RowGroupMetaData {
  columns: Vec<ColumnChunkMetaData>,
  num_rows: i64,
  total_byte_size: i64,
  schema_descr: SchemaDescPtr
}

impl RowGroupMetaData {
  pub fn new(
    schema_descr: SchemaDescPtr,
    num_rows: i64,
    total_byte_size: i64,
    columns: Vec<ColumnChunkMetaData>
  ) -> Self {
    RowGroupMetaData { columns, num_rows, total_byte_size, schema_descr }
  }

  pub fn num_columns(&self) -> usize {
    self.columns.len()
  }

  pub fn column(&self, i: usize) -> &ColumnChunkMetaData {
    &self.columns[i]
  }

  pub fn columns(&self) -> &[ColumnChunkMetaData] {
    &self.columns
  }

  pub fn num_rows(&self) -> i64 {
    self.num_rows
  }

  /// Total size in bytes of the uncompressed page payloads of this row group.
  pub fn total_byte_size(&self) -> i64 {
    self.total_byte_size
  }

  pub fn schema_descr(&self) -> &SchemaDescriptor {
    self.schema_descr.as_ref()
  }

  pub fn schema_descr_ptr(&self) -> SchemaDescPtr {
    self.schema_descr.clone()
  }

  fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
    sink.write_u64::<LittleEndian>(self.num_rows as u64)?;
    sink.write_u64::<LittleEndian>(self.total_byte_size as u64)?;
    sink.write_u32::<LittleEndian>(self.columns.len() as u32)?;
    for column in &self.columns {
      sink.write_u16::<LittleEndian>(column.column_descr.column_index())?;
      sink.write_u8(column.column_type().into())?;
      sink.write_u8(column.compression.into())?;
      sink.write_u8(column.encoding.into())?;
      sink.write_u64::<LittleEndian>(column.num_values as u64)?;
      sink.write_u32::<LittleEndian>(column.num_pages)?;
      sink.write_u64::<LittleEndian>(column.data_page_offset as u64)?;
      sink.write_u64::<LittleEndian>(column.total_compressed_size as u64)?;
      sink.write_u64::<LittleEndian>(column.total_uncompressed_size as u64)?;
    }
    Ok(())
  }

  fn read_from(cursor: &mut Cursor<&[u8]>, schema_descr: SchemaDescPtr) -> Result<Self> {
    let num_rows = cursor.read_u64::<LittleEndian>()? as i64;
    let total_byte_size = cursor.read_u64::<LittleEndian>()? as i64;
    let num_columns = cursor.read_u32::<LittleEndian>()? as usize;
    if num_columns != schema_descr.num_columns() {
      return Err(general_err!(
        "Invalid footer: row group has {} columns, schema has {}",
        num_columns, schema_descr.num_columns()
      ));
    }
    let mut columns = Vec::with_capacity(num_columns);
    for i in 0..num_columns {
      let column_index = cursor.read_u16::<LittleEndian>()? as usize;
      if column_index != i {
        return Err(general_err!("Invalid footer: column chunk {} at position {}", column_index, i));
      }
      let column_descr = schema_descr.column(i);
      let physical_type = Type::try_from(cursor.read_u8()?)?;
      if physical_type != column_descr.physical_type() {
        return Err(general_err!(
          "Invalid footer: column chunk of type {} for column '{}' of type {}",
          physical_type, column_descr.path(), column_descr.physical_type()
        ));
      }
      let compression = Compression::try_from(cursor.read_u8()?)?;
      let encoding = Encoding::try_from(cursor.read_u8()?)?;
      let num_values = cursor.read_u64::<LittleEndian>()? as i64;
      let num_pages = cursor.read_u32::<LittleEndian>()?;
      let data_page_offset = cursor.read_u64::<LittleEndian>()? as i64;
      let total_compressed_size = cursor.read_u64::<LittleEndian>()? as i64;
      let total_uncompressed_size = cursor.read_u64::<LittleEndian>()? as i64;
      if data_page_offset < 0 || total_compressed_size < 0 || num_values < 0 {
        return Err(general_err!("Invalid footer: negative offset or size for column {}", i));
      }
      columns.push(ColumnChunkMetaData {
        column_descr,
        compression,
        encoding,
        num_values,
        num_pages,
        data_page_offset,
        total_compressed_size,
        total_uncompressed_size
      });
    }
    Ok(RowGroupMetaData::new(schema_descr, num_rows, total_byte_size, columns))
  }
}

/// Metadata for a column chunk.
#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
  column_descr: ColumnDescPtr,
  compression: Compression,
  encoding: Encoding,
  num_values: i64,
  num_pages: u32,
  data_page_offset: i64,
  total_compressed_size: i64,
  total_uncompressed_size: i64
}

impl ColumnChunkMetaData {
  /// Creates metadata for a column chunk starting at byte `data_page_offset`, with no
  /// pages yet.
  pub(crate) fn new(
    column_descr: ColumnDescPtr,
    compression: Compression,
    data_page_offset: i64
  ) -> Self {
    ColumnChunkMetaData {
      column_descr,
      compression,
      encoding: Encoding::PLAIN,
      num_values: 0,
      num_pages: 0,
      data_page_offset,
      total_compressed_size: 0,
      total_uncompressed_size: 0
    }
  }

  /// Records a page of `header` written right after the previous page of this chunk,
  /// `header_size` bytes for its header.
  pub(crate) fn add_page(&mut self, header: &PageHeader, header_size: usize) {
    self.num_pages += 1;
    self.num_values += header.num_values as i64;
    self.total_compressed_size += (header_size + header.compressed_size as usize) as i64;
    self.total_uncompressed_size += (header_size + header.uncompressed_size as usize) as i64;
  }

  /// Type of this column. Must be primitive.
  pub fn column_type(&self) -> Type {
    self.column_descr.physical_type()
  }

  /// Path (or identifier) of this column.
  pub fn column_path(&self) -> &ColumnPath {
    self.column_descr.path()
  }

  /// Descriptor for this column.
  pub fn column_descr(&self) -> &ColumnDescPtr {
    &self.column_descr
  }

  pub fn compression(&self) -> Compression {
    self.compression
  }

  /// Encoding of the page payloads.
  pub fn encoding(&self) -> Encoding {
    self.encoding
  }

  /// Total number of values in this column chunk, nulls included.
  pub fn num_values(&self) -> i64 {
    self.num_values
  }

  pub fn num_pages(&self) -> u32 {
    self.num_pages
  }

  /// Byte offset of the first page of this column chunk.
  pub fn data_page_offset(&self) -> i64 {
    self.data_page_offset
  }

  /// Size of the column chunk in the file, page headers included.
  pub fn compressed_size(&self) -> i64 {
    self.total_compressed_size
  }

  /// Size of the column chunk with uncompressed payloads, page headers included.
  pub fn uncompressed_size(&self) -> i64 {
    self.total_uncompressed_size
  }

  /// Byte range of this column chunk in the file.
  pub fn byte_range(&self) -> (u64, u64) {
    (self.data_page_offset as u64, self.total_compressed_size as u64)
  }
}

// ----------------------------------------------------------------------
// Page headers

/// Size in bytes of a serialized [`PageHeader`].
pub const PAGE_HEADER_SIZE: usize = 21;

/// Header written before every page payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PageHeader {
  pub uncompressed_size: u32,
  pub compressed_size: u32,
  pub num_values: u32,
  pub num_nulls: u32,
  pub num_rows: u32,
  pub encoding: Encoding
}

impl PageHeader {
  pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<usize> {
    sink.write_u32::<LittleEndian>(self.uncompressed_size)?;
    sink.write_u32::<LittleEndian>(self.compressed_size)?;
    sink.write_u32::<LittleEndian>(self.num_values)?;
    sink.write_u32::<LittleEndian>(self.num_nulls)?;
    sink.write_u32::<LittleEndian>(self.num_rows)?;
    sink.write_u8(self.encoding.into())?;
    Ok(PAGE_HEADER_SIZE)
  }

  pub fn read_from<R: Read>(source: &mut R) -> Result<Self> {
    let mut buf = [0; PAGE_HEADER_SIZE];
    source.read_exact(&mut buf).map_err(|e| general_err!("Invalid page header: {}", e))?;
    let mut cursor = Cursor::new(&buf[..]);
    Ok(PageHeader {
      uncompressed_size: cursor.read_u32::<LittleEndian>()?,
      compressed_size: cursor.read_u32::<LittleEndian>()?,
      num_values: cursor.read_u32::<LittleEndian>()?,
      num_nulls: cursor.read_u32::<LittleEndian>()?,
      num_rows: cursor.read_u32::<LittleEndian>()?,
      encoding: Encoding::try_from(cursor.read_u8()?)?
    })
  }
}
