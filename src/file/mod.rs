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

//! Main entrypoint for working with files: writing buffered row groups, and reading
//! back metadata, pages and rows.
//!
//! See [`writer::SerializedFileWriter`] and [`reader::SerializedFileReader`] for a
//! starting reference and [`metadata::ParquetMetaData`] for file metadata.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! use parquet_shred::basic::{Repetition, Type as PhysicalType};
//! use parquet_shred::buffer::Buffer;
//! use parquet_shred::file::properties::WriterProperties;
//! use parquet_shred::file::reader::{FileReader, RowGroupReader, SerializedFileReader};
//! use parquet_shred::file::writer::SerializedFileWriter;
//! use parquet_shred::schema::types::{SchemaDescriptor, Type};
//! use parquet_shred::value::Value;
//!
//! let schema = Type::message("schema", vec![
//!   Type::primitive("id", Repetition::REQUIRED, PhysicalType::INT32).unwrap()
//! ]).unwrap();
//! let schema = Arc::new(SchemaDescriptor::new(Arc::new(schema)).unwrap());
//!
//! let mut buffer = Buffer::new(schema.clone());
//! for i in 0..10 {
//!   buffer.write_row(&[Value::int32(i)]).unwrap();
//! }
//!
//! let props = Arc::new(WriterProperties::builder().build());
//! let mut writer = SerializedFileWriter::new(Cursor::new(vec![]), schema, props).unwrap();
//! assert_eq!(writer.write_row_group(&buffer).unwrap(), 10);
//! writer.close().unwrap();
//!
//! let reader = SerializedFileReader::new(writer.into_inner()).unwrap();
//! assert_eq!(reader.metadata().num_row_groups(), 1);
//!
//! let row_group_reader = reader.get_row_group(0).unwrap();
//! assert_eq!(row_group_reader.num_columns(), 1);
//! assert_eq!(row_group_reader.rows().unwrap().count(), 10);
//! ```

pub mod metadata;
pub mod properties;
pub mod reader;
pub mod writer;

/// Magic bytes at the start and at the end of every file.
pub const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];

/// Size of the trailer: footer length and magic.
pub const FOOTER_SIZE: usize = 8;
