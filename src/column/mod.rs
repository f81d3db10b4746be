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

//! Column level API: pages of typed values and the buffers that build them.
//!
//! A [`buffer::ColumnBuffer`] accumulates the values of one leaf column, and exposes
//! them as a [`page::Page`]. Pages can be read as typed batches, as a byte stream or
//! slot by slot with their definition and repetition levels.
//!
//! # Example
//!
//! ```rust
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! use parquet_shred::basic::{Repetition, Type as PhysicalType};
//! use parquet_shred::column::buffer::ColumnBuffer;
//! use parquet_shred::schema::types::{SchemaDescriptor, Type};
//!
//! let schema = Type::message("schema", vec![
//!   Type::primitive("id", Repetition::REQUIRED, PhysicalType::INT32).unwrap()
//! ]).unwrap();
//! let schema = SchemaDescriptor::new(Arc::new(schema)).unwrap();
//!
//! let mut column = ColumnBuffer::new(schema.column(0));
//! column.write_int32s(&[1, 2, 3]).unwrap();
//!
//! let mut values = [0; 2];
//! let mut reader = column.page().values();
//! assert_eq!(reader.read_int32s(&mut values).unwrap(), 2);
//! assert_eq!(values, [1, 2]);
//!
//! let mut bytes = vec![];
//! reader.read_to_end(&mut bytes).unwrap();
//! assert_eq!(bytes, vec![3, 0, 0, 0]);
//! ```

pub mod buffer;
pub mod page;
