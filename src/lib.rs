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

//! Column page engine and record shredding for the
//! [Apache Parquet](https://parquet.apache.org/) format.
//!
//! Records are shredded into rows of [`value::Value`]s, one run of values per leaf
//! column, each value carrying its column index and its repetition and definition
//! levels. A [`buffer::Buffer`] fans rows out to one
//! [`column::buffer::ColumnBuffer`] per leaf column, and reads them back through a
//! [`buffer::RowReader`]. Buffers are written to files as row groups by
//! [`file::writer::SerializedFileWriter`] and read back page by page or row by row
//! through [`file::reader::SerializedFileReader`].
//!
//! Column values are exposed as [`column::page::Page`]s, readable as typed batches or
//! as a little-endian byte stream.

#![allow(non_camel_case_types)]

#[macro_use]
extern crate quick_error;

#[macro_use]
pub mod errors;
pub mod basic;
pub mod data_type;
pub mod value;
pub mod schema;
pub mod record;
pub mod column;
pub mod buffer;
pub mod encodings;
pub mod compression;
pub mod file;
pub mod util;
