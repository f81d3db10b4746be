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

//! Contains file reader API, and provides methods to access file metadata, row group
//! readers to read individual column chunks, or access row reader.

use std::io::{Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex};

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, trace};

use crate::basic::{Compression, Encoding};
use crate::buffer::RowReader;
use crate::column::page::{Page, PageReader};
use crate::compression::{create_codec, Codec};
use crate::encodings::plain;
use crate::errors::{ParquetError, Result};
use crate::file::metadata::*;
use crate::file::{FOOTER_SIZE, PARQUET_MAGIC};
use crate::schema::types::{ColumnDescPtr, SchemaDescriptor};
use crate::util::io::{FileChunk, SharedSource};

// ----------------------------------------------------------------------
// APIs for file & row group readers

/// Parquet file reader API. With this, user can get metadata information about the
/// Parquet file, and can get reader for each row group.
pub trait FileReader {
  /// Get metadata information about this file.
  fn metadata(&self) -> &ParquetMetaData;

  /// Get the total number of row groups for this file.
  fn num_row_groups(&self) -> usize;

  /// Get the `i`th row group reader. Note this doesn't do bound check.
  fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>>;
}

/// Parquet row group reader API. With this, user can get metadata information about
/// the row group, as well as readers for each individual column chunk.
pub trait RowGroupReader {
  /// Get metadata information about this row group.
  fn metadata(&self) -> &RowGroupMetaData;

  /// Get the total number of column chunks in this row group.
  fn num_columns(&self) -> usize;

  /// Get page reader for the `i`th column chunk.
  fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader + '_>>;

  /// Get a reader over the rows of this row group, assembled from every column chunk.
  fn rows(&self) -> Result<RowReader<'_>> {
    let readers = (0..self.num_columns())
      .map(|i| self.get_column_page_reader(i))
      .collect::<Result<Vec<_>>>()?;
    Ok(RowReader::from_page_readers(self.metadata().schema_descr_ptr(), readers))
  }
}

// ----------------------------------------------------------------------
// Serialized impl for file & row group readers

/// A serialized implementation for Parquet [`FileReader`].
pub struct SerializedFileReader<R: Read + Seek> {
  source: SharedSource<R>,
  metadata: ParquetMetaData
}

impl<R: Read + Seek> SerializedFileReader<R> {
  /// Creates file reader from a seekable source, e.g. a `File` or an in-memory
  /// `Cursor`. Reads and validates the file footer.
  pub fn new(mut source: R) -> Result<Self> {
    let metadata = Self::parse_metadata(&mut source)?;
    Ok(Self { source: Arc::new(Mutex::new(source)), metadata })
  }

  /// Returns the schema of the rows stored in this file.
  pub fn schema(&self) -> &SchemaDescriptor {
    self.metadata.file_metadata().schema_descr()
  }

  // Layout of Parquet file
  // +---------------------------+---+-----+
  // |      Rest of file         | B |  A  |
  // +---------------------------+---+-----+
  // where A: parquet footer, B: parquet metadata.
  //
  fn parse_metadata(source: &mut R) -> Result<ParquetMetaData> {
    let file_size = source.seek(SeekFrom::End(0))?;
    if file_size < (PARQUET_MAGIC.len() + FOOTER_SIZE) as u64 {
      return Err(general_err!(
        "Invalid Parquet file. Size is smaller than header and footer ({} bytes)", file_size
      ));
    }
    let mut magic = [0; 4];
    source.seek(SeekFrom::Start(0))?;
    source.read_exact(&mut magic)?;
    if magic != PARQUET_MAGIC {
      return Err(general_err!("Invalid Parquet file. Corrupt header"));
    }

    let mut footer_buffer = [0; FOOTER_SIZE];
    source.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
    source.read_exact(&mut footer_buffer)?;
    if footer_buffer[4..] != PARQUET_MAGIC {
      return Err(general_err!("Invalid Parquet file. Corrupt footer"));
    }
    let metadata_len = LittleEndian::read_i32(&footer_buffer[0..4]) as i64;
    if metadata_len < 0 {
      return Err(general_err!(
        "Invalid Parquet file. Metadata length is less than zero ({})", metadata_len
      ));
    }
    let metadata_start = file_size as i64 - FOOTER_SIZE as i64 - metadata_len;
    if metadata_start < PARQUET_MAGIC.len() as i64 {
      return Err(general_err!(
        "Invalid Parquet file. Metadata start is less than zero ({})",
        metadata_start - PARQUET_MAGIC.len() as i64
      ));
    }
    let mut metadata_buffer = vec![0; metadata_len as usize];
    source.seek(SeekFrom::Start(metadata_start as u64))?;
    source.read_exact(&mut metadata_buffer)?;
    let metadata = ParquetMetaData::parse_footer(&metadata_buffer)?;

    // Column chunks must lie between the header and the footer
    for (i, row_group) in metadata.row_groups().iter().enumerate() {
      for column in row_group.columns() {
        let (start, len) = column.byte_range();
        if start < PARQUET_MAGIC.len() as u64 || start + len > metadata_start as u64 {
          return Err(general_err!(
            "Invalid Parquet file. Column chunk '{}' of row group {} is out of bounds",
            column.column_path(), i
          ));
        }
      }
    }
    debug!(
      file_size,
      footer_size = metadata_len,
      num_row_groups = metadata.num_row_groups(),
      num_rows = metadata.file_metadata().num_rows(),
      "opened file reader"
    );
    Ok(metadata)
  }
}

impl<R: Read + Seek> FileReader for SerializedFileReader<R> {
  fn metadata(&self) -> &ParquetMetaData {
    &self.metadata
  }

  fn num_row_groups(&self) -> usize {
    self.metadata.num_row_groups()
  }

  fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>> {
    if i >= self.num_row_groups() {
      return Err(general_err!(
        "Row group index {} out of bound ({} row groups)", i, self.num_row_groups()
      ));
    }
    let row_group_metadata = self.metadata.row_groups()[i].clone();
    Ok(Box::new(SerializedRowGroupReader::new(self.source.clone(), row_group_metadata)))
  }
}

/// A serialized implementation for Parquet [`RowGroupReader`].
pub struct SerializedRowGroupReader<R: Read + Seek> {
  source: SharedSource<R>,
  metadata: RowGroupMetaDataPtr
}

impl<R: Read + Seek> SerializedRowGroupReader<R> {
  /// Creates new row group reader from a shared source and row group metadata.
  pub fn new(source: SharedSource<R>, metadata: RowGroupMetaDataPtr) -> Self {
    Self { source, metadata }
  }

  /// Number of rows in this row group.
  pub fn num_rows(&self) -> usize {
    self.metadata.num_rows() as usize
  }
}

impl<R: Read + Seek> RowGroupReader for SerializedRowGroupReader<R> {
  fn metadata(&self) -> &RowGroupMetaData {
    &self.metadata
  }

  fn num_columns(&self) -> usize {
    self.metadata.num_columns()
  }

  fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader + '_>> {
    if i >= self.num_columns() {
      return Err(general_err!(
        "Column index {} out of bound ({} columns)", i, self.num_columns()
      ));
    }
    let column = self.metadata.column(i);
    let (start, len) = column.byte_range();
    let page_reader = SerializedPageReader::new(
      FileChunk::new(self.source.clone(), start, len),
      column.column_descr().clone(),
      column.num_pages(),
      column.compression()
    )?;
    Ok(Box::new(page_reader))
  }
}

/// A serialized implementation for Parquet [`PageReader`].
pub struct SerializedPageReader<R: Read + Seek> {
  // The file chunk buffer which references exactly the bytes for the column trunk
  // to be read by this page reader.
  buf: FileChunk<R>,

  // The column this page reader is for.
  descr: ColumnDescPtr,

  // The compression codec for this column chunk. Only set for non-PLAIN codec.
  decompressor: Option<Box<dyn Codec>>,

  // The number of pages left in this column chunk.
  num_pages_left: u32
}

impl<R: Read + Seek> SerializedPageReader<R> {
  /// Creates a new serialized page reader over the `num_pages` pages of `buf`.
  pub fn new(
    buf: FileChunk<R>,
    descr: ColumnDescPtr,
    num_pages: u32,
    compression: Compression
  ) -> Result<Self> {
    let decompressor = create_codec(compression)?;
    Ok(Self { buf, descr, decompressor, num_pages_left: num_pages })
  }

  fn decode_next_page(&mut self) -> Result<Page> {
    let header = PageHeader::read_from(&mut self.buf)?;
    if header.encoding != Encoding::PLAIN {
      return Err(nyi_err!("Page encoding {} is not supported", header.encoding));
    }
    if header.num_values == 0 {
      return Err(general_err!("Invalid page: no values"));
    }
    if header.compressed_size as u64 > self.buf.remaining() {
      return Err(general_err!(
        "Invalid page: {} bytes of payload, {} left in column chunk",
        header.compressed_size, self.buf.remaining()
      ));
    }
    let mut buffer = vec![0; header.compressed_size as usize];
    self.buf.read_exact(&mut buffer)?;
    if let Some(ref mut decompressor) = self.decompressor {
      let mut decompressed = Vec::with_capacity(header.uncompressed_size as usize);
      decompressor.decompress(&buffer, &mut decompressed)?;
      buffer = decompressed;
    }
    if buffer.len() != header.uncompressed_size as usize {
      return Err(general_err!(
        "Actual decompressed size doesn't match the expected one ({} vs {})",
        buffer.len(), header.uncompressed_size
      ));
    }
    let page = plain::decode_page(
      self.descr.clone(), &buffer, header.num_values as usize, header.num_nulls as usize
    )?;
    if page.num_rows() != header.num_rows as usize {
      return Err(general_err!(
        "Invalid page: header says {} rows, page has {}", header.num_rows, page.num_rows()
      ));
    }
    trace!(
      column = %self.descr.path(),
      num_values = header.num_values,
      num_rows = header.num_rows,
      bytes = header.compressed_size,
      "read page"
    );
    Ok(page)
  }
}

impl<R: Read + Seek> PageReader for SerializedPageReader<R> {
  fn get_next_page(&mut self) -> Result<Option<Page>> {
    if self.num_pages_left == 0 {
      return Ok(None);
    }
    let page = self.decode_next_page()?;
    self.num_pages_left -= 1;
    Ok(Some(page))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  use crate::basic::{Compression, Repetition, Type as PhysicalType};
  use crate::buffer::Buffer;
  use crate::file::properties::WriterProperties;
  use crate::file::writer::SerializedFileWriter;
  use crate::schema::types::{SchemaDescPtr, Type};
  use crate::value::Value;

  fn schema() -> SchemaDescPtr {
    let schema = Type::message("schema", vec![
      Type::primitive("id", Repetition::REQUIRED, PhysicalType::INT64).unwrap(),
      Type::primitive("tags", Repetition::REPEATED, PhysicalType::BYTE_ARRAY).unwrap()
    ]).unwrap();
    Arc::new(SchemaDescriptor::new(Arc::new(schema)).unwrap())
  }

  fn row(i: i64) -> Vec<Value> {
    let mut row = vec![Value::int64(i)];
    if i % 3 == 0 {
      row.push(Value::null(1, 0, 0));
    }
    for j in 0..i % 3 {
      let rep = if j == 0 { 0 } else { 1 };
      let tag = Value::byte_array(format!("{}", j).into());
      row.push(tag.with_column_index(1).with_levels(rep, 1));
    }
    row
  }

  fn write_file(compression: Compression, row_groups: &[i64]) -> Vec<u8> {
    let props = WriterProperties::builder()
      .set_compression(compression)
      .set_data_page_row_limit(7)
      .build();
    let mut writer =
      SerializedFileWriter::new(Cursor::new(vec![]), schema(), Arc::new(props)).unwrap();
    for &num_rows in row_groups {
      let mut buffer = Buffer::new(schema());
      for i in 0..num_rows {
        buffer.write_row(&row(i)).unwrap();
      }
      writer.write_row_group(&buffer).unwrap();
    }
    writer.close().unwrap();
    writer.into_inner().into_inner()
  }

  #[test]
  fn test_file_reader_metadata() {
    let bytes = write_file(Compression::UNCOMPRESSED, &[20, 5]);
    let reader = SerializedFileReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.num_row_groups(), 2);
    assert_eq!(reader.metadata().file_metadata().num_rows(), 25);
    assert_eq!(reader.schema(), schema().as_ref());
    let row_group = reader.get_row_group(0).unwrap();
    assert_eq!(row_group.num_columns(), 2);
    assert_eq!(row_group.metadata().column(0).num_pages(), 3);
    assert!(reader.get_row_group(2).is_err());
    assert!(row_group.get_column_page_reader(2).is_err());
  }

  #[test]
  fn test_page_reader_eof() {
    let bytes = write_file(Compression::SNAPPY, &[20]);
    let reader = SerializedFileReader::new(Cursor::new(bytes)).unwrap();
    let row_group = reader.get_row_group(0).unwrap();
    let mut pages = row_group.get_column_page_reader(0).unwrap();
    let mut ids = vec![];
    loop {
      match pages.read_page() {
        Ok(page) => {
          let mut buf = vec![0; page.num_values()];
          let n = page.values().read_int64s(&mut buf).unwrap();
          ids.extend_from_slice(&buf[..n]);
        },
        Err(e) => {
          assert!(e.is_eof());
          break;
        }
      }
    }
    assert_eq!(ids, (0..20).collect::<Vec<i64>>());
    assert!(pages.read_page().unwrap_err().is_eof());
  }

  #[test]
  fn test_rows_across_pages_and_codecs() {
    let codecs = [
      Compression::UNCOMPRESSED, Compression::SNAPPY, Compression::GZIP, Compression::BROTLI
    ];
    for &codec in &codecs {
      let bytes = write_file(codec, &[20, 0, 3]);
      let reader = SerializedFileReader::new(Cursor::new(bytes)).unwrap();
      for (i, &num_rows) in [20, 0, 3].iter().enumerate() {
        let row_group = reader.get_row_group(i).unwrap();
        let rows = row_group.rows().unwrap().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, (0..num_rows).map(row).collect::<Vec<_>>());
      }
    }
  }

  #[test]
  fn test_invalid_files() {
    assert!(SerializedFileReader::new(Cursor::new(vec![])).is_err());
    assert!(SerializedFileReader::new(Cursor::new(b"PAR1PAR1".to_vec())).is_err());

    let bytes = write_file(Compression::UNCOMPRESSED, &[2]);
    let mut bad_magic = bytes.clone();
    bad_magic[0] = b'X';
    assert!(SerializedFileReader::new(Cursor::new(bad_magic)).is_err());

    let mut bad_footer = bytes.clone();
    let len = bad_footer.len();
    bad_footer[len - 1] = b'X';
    assert!(SerializedFileReader::new(Cursor::new(bad_footer)).is_err());

    let mut negative_len = bytes.clone();
    negative_len[len - 8..len - 4].copy_from_slice(&(-1i32).to_le_bytes());
    assert!(SerializedFileReader::new(Cursor::new(negative_len)).is_err());

    let mut too_long = bytes;
    too_long[len - 8..len - 4].copy_from_slice(&(len as i32).to_le_bytes());
    assert!(SerializedFileReader::new(Cursor::new(too_long)).is_err());
  }

  #[test]
  fn test_corrupt_page() {
    let mut bytes = write_file(Compression::UNCOMPRESSED, &[4]);
    // num_values of the first page header
    bytes[4 + 8] = 0;
    let reader = SerializedFileReader::new(Cursor::new(bytes)).unwrap();
    let row_group = reader.get_row_group(0).unwrap();
    let err = row_group.get_column_page_reader(0).unwrap().read_page().unwrap_err();
    assert!(!err.is_eof());
  }
}
