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

//! Contains file writer API, and provides methods to write row groups from in-memory
//! buffers.

use std::io::Write;
use std::sync::Arc;

use tracing::debug;

use crate::basic::Encoding;
use crate::buffer::Buffer;
use crate::column::buffer::ColumnBuffer;
use crate::compression::{create_codec, Codec};
use crate::encodings::plain;
use crate::errors::{ParquetError, Result};
use crate::file::metadata::{
  ColumnChunkMetaData, FileMetaData, PageHeader, ParquetMetaData, RowGroupMetaData,
  RowGroupMetaDataPtr
};
use crate::file::properties::WriterPropertiesPtr;
use crate::file::PARQUET_MAGIC;
use crate::schema::types::SchemaDescPtr;
use crate::util::io::TrackedWrite;

/// Serialized file writer.
///
/// Writes the magic, then one row group per [`SerializedFileWriter::write_row_group`]
/// call, then the footer on [`SerializedFileWriter::close`]. The writer cannot be used
/// once closed.
pub struct SerializedFileWriter<W: Write> {
  sink: TrackedWrite<W>,
  schema: SchemaDescPtr,
  props: WriterPropertiesPtr,
  codec: Option<Box<dyn Codec>>,
  row_groups: Vec<RowGroupMetaDataPtr>,
  is_closed: bool
}

impl<W: Write> SerializedFileWriter<W> {
  /// Creates new file writer for rows of `schema`, and writes the leading magic.
  pub fn new(sink: W, schema: SchemaDescPtr, props: WriterPropertiesPtr) -> Result<Self> {
    let codec = create_codec(props.compression())?;
    let mut sink = TrackedWrite::new(sink);
    sink.write_all(&PARQUET_MAGIC)?;
    debug!(schema = schema.name(), compression = %props.compression(), "opened file writer");
    Ok(Self { sink, schema, props, codec, row_groups: vec![], is_closed: false })
  }

  pub fn schema(&self) -> &SchemaDescPtr {
    &self.schema
  }

  pub fn properties(&self) -> &WriterPropertiesPtr {
    &self.props
  }

  /// Metadata of the row groups written so far.
  pub fn row_groups(&self) -> &[RowGroupMetaDataPtr] {
    &self.row_groups
  }

  /// Writes the rows of `buffer` as a new row group and returns the number of rows
  /// written. The buffer must be of this writer's schema, with all columns aligned.
  pub fn write_row_group(&mut self, buffer: &Buffer) -> Result<usize> {
    self.assert_not_closed()?;
    if buffer.schema() != &self.schema {
      return Err(general_err!(
        "Buffer schema '{}' does not match file schema '{}'",
        buffer.schema().name(), self.schema.name()
      ));
    }
    buffer.check_aligned()?;

    // Column chunks are encoded in memory first, so a failure writes nothing
    let mut offset = self.sink.bytes_written() as i64;
    let mut data = vec![];
    let mut columns = Vec::with_capacity(buffer.num_columns());
    for column in buffer.columns() {
      let start = data.len();
      let metadata = self.encode_column_chunk(column, offset, &mut data)?;
      offset += (data.len() - start) as i64;
      columns.push(metadata);
    }
    self.sink.write_all(&data)?;

    let num_rows = buffer.num_rows();
    let total_byte_size = columns.iter().map(|c| c.uncompressed_size()).sum();
    debug!(
      row_group = self.row_groups.len(),
      num_rows,
      num_columns = columns.len(),
      bytes = data.len(),
      "wrote row group"
    );
    let row_group = RowGroupMetaData::new(
      self.schema.clone(), num_rows as i64, total_byte_size, columns
    );
    self.row_groups.push(Arc::new(row_group));
    Ok(num_rows)
  }

  /// Encodes the pages of one column into `out`, the first page landing at file
  /// offset `offset`.
  fn encode_column_chunk(
    &mut self,
    column: &ColumnBuffer,
    offset: i64,
    out: &mut Vec<u8>
  ) -> Result<ColumnChunkMetaData> {
    let mut metadata =
      ColumnChunkMetaData::new(column.column_descr().clone(), self.props.compression(), offset);
    let mut uncompressed = vec![];
    let mut compressed = vec![];
    for page in column.page().split(self.props.data_page_row_limit()) {
      uncompressed.clear();
      plain::encode_page(&page, &mut uncompressed)?;
      let payload = match self.codec {
        Some(ref mut codec) => {
          compressed.clear();
          codec.compress(&uncompressed, &mut compressed)?;
          &compressed
        },
        None => &uncompressed
      };
      let header = PageHeader {
        uncompressed_size: to_u32(uncompressed.len())?,
        compressed_size: to_u32(payload.len())?,
        num_values: to_u32(page.num_values())?,
        num_nulls: to_u32(page.num_nulls())?,
        num_rows: to_u32(page.num_rows())?,
        encoding: Encoding::PLAIN
      };
      let header_size = header.write_to(out)?;
      out.extend_from_slice(payload);
      metadata.add_page(&header, header_size);
    }
    debug!(
      column = %column.column_descr().path(),
      num_pages = metadata.num_pages(),
      num_values = metadata.num_values(),
      bytes = metadata.compressed_size(),
      "encoded column chunk"
    );
    Ok(metadata)
  }

  /// Writes the footer and finalizes the file. The writer cannot be used afterwards.
  pub fn close(&mut self) -> Result<()> {
    self.assert_not_closed()?;
    let num_rows = self.row_groups.iter().map(|rg| rg.num_rows()).sum();
    let file_metadata = FileMetaData::new(
      num_rows,
      self.props.created_by().to_owned(),
      self.schema.root_schema_ptr(),
      self.schema.clone()
    );
    let metadata = ParquetMetaData::new(file_metadata, self.row_groups.clone());
    let mut footer = vec![];
    metadata.write_footer(&mut footer)?;
    self.sink.write_all(&footer)?;
    self.sink.write_all(&to_u32(footer.len())?.to_le_bytes())?;
    self.sink.write_all(&PARQUET_MAGIC)?;
    self.sink.flush()?;
    self.is_closed = true;
    debug!(
      num_row_groups = self.row_groups.len(),
      num_rows,
      bytes = self.sink.bytes_written(),
      "closed file writer"
    );
    Ok(())
  }

  /// Returns the underlying sink.
  pub fn into_inner(self) -> W {
    self.sink.into_inner()
  }

  #[inline]
  fn assert_not_closed(&self) -> Result<()> {
    if self.is_closed {
      Err(general_err!("File writer is closed"))
    } else {
      Ok(())
    }
  }
}

#[inline]
fn to_u32(n: usize) -> Result<u32> {
  u32::try_from(n).map_err(|_| general_err!("Size {} does not fit in a page header", n))
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  use crate::basic::{Compression, Repetition, Type as PhysicalType};
  use crate::file::properties::WriterProperties;
  use crate::schema::types::{SchemaDescriptor, Type};
  use crate::value::Value;

  fn schema() -> SchemaDescPtr {
    let schema = Type::message("schema", vec![
      Type::primitive("id", Repetition::REQUIRED, PhysicalType::INT32).unwrap(),
      Type::primitive("name", Repetition::OPTIONAL, PhysicalType::BYTE_ARRAY).unwrap()
    ]).unwrap();
    Arc::new(SchemaDescriptor::new(Arc::new(schema)).unwrap())
  }

  fn buffer(num_rows: i32) -> Buffer {
    let mut buffer = Buffer::new(schema());
    for i in 0..num_rows {
      let name = if i % 2 == 0 {
        Value::byte_array("x".into()).with_column_index(1).with_levels(0, 1)
      } else {
        Value::null(1, 0, 0)
      };
      buffer.write_row(&[Value::int32(i), name]).unwrap();
    }
    buffer
  }

  fn writer(props: WriterProperties) -> SerializedFileWriter<Cursor<Vec<u8>>> {
    SerializedFileWriter::new(Cursor::new(vec![]), schema(), Arc::new(props)).unwrap()
  }

  #[test]
  fn test_file_writer_error_after_close() {
    let mut writer = writer(WriterProperties::default());
    writer.close().unwrap();
    assert!(writer.write_row_group(&buffer(1)).is_err());
    assert!(writer.close().is_err());
  }

  #[test]
  fn test_file_writer_empty_file() {
    let mut writer = writer(WriterProperties::default());
    writer.close().unwrap();
    let bytes = writer.into_inner().into_inner();
    assert_eq!(&bytes[..4], b"PAR1");
    assert_eq!(&bytes[bytes.len() - 4..], b"PAR1");
    let footer_len = u32::from_le_bytes([
      bytes[bytes.len() - 8], bytes[bytes.len() - 7], bytes[bytes.len() - 6], bytes[bytes.len() - 5]
    ]) as usize;
    assert_eq!(bytes.len(), 4 + footer_len + 8);
  }

  #[test]
  fn test_file_writer_row_groups() {
    let props = WriterProperties::builder()
      .set_compression(Compression::GZIP)
      .set_data_page_row_limit(4)
      .build();
    let mut writer = writer(props);
    assert_eq!(writer.write_row_group(&buffer(10)).unwrap(), 10);
    assert_eq!(writer.write_row_group(&buffer(0)).unwrap(), 0);

    let row_groups = writer.row_groups();
    assert_eq!(row_groups.len(), 2);
    assert_eq!(row_groups[0].num_rows(), 10);
    let id = row_groups[0].column(0);
    assert_eq!(id.num_pages(), 3);
    assert_eq!(id.num_values(), 10);
    assert_eq!(id.compression(), Compression::GZIP);
    assert_eq!(id.data_page_offset(), 4);
    let name = row_groups[0].column(1);
    assert_eq!(name.data_page_offset(), 4 + id.compressed_size());
    assert_eq!(row_groups[1].column(0).num_pages(), 0);
    writer.close().unwrap();
  }

  #[test]
  fn test_file_writer_rejects_misaligned_buffer() {
    let mut writer = writer(WriterProperties::default());
    let mut buffer = buffer(2);
    buffer.column_mut(0).write_int32s(&[5]).unwrap();
    assert!(writer.write_row_group(&buffer).is_err());

    let other = Type::message("other", vec![
      Type::primitive("id", Repetition::REQUIRED, PhysicalType::INT32).unwrap()
    ]).unwrap();
    let other = Buffer::new(Arc::new(SchemaDescriptor::new(Arc::new(other)).unwrap()));
    assert!(writer.write_row_group(&other).is_err());
    assert!(writer.row_groups().is_empty());
  }
}
