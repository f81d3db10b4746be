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

//! Prints the schema of a file and, in verbose mode, its row group and column chunk
//! metadata.
//!
//! Usage: `parquet-schema <file-path> [verbose]`

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use parquet_shred::errors::Result;
use parquet_shred::file::metadata::ParquetMetaData;
use parquet_shred::file::reader::{FileReader, SerializedFileReader};

fn main() {
  let args: Vec<String> = env::args().collect();
  if args.len() != 2 && args.len() != 3 {
    println!("Usage: parquet-schema <file-path> [verbose]");
    process::exit(1);
  }
  let verbose = match args.get(2).map(|v| v.parse::<bool>()) {
    None => false,
    Some(Ok(b)) => b,
    Some(Err(e)) => {
      eprintln!("Error when reading value for [verbose] (expected either 'true' or 'false'): {}", e);
      process::exit(1);
    }
  };
  let path = Path::new(&args[1]);
  let file = match File::open(path) {
    Ok(f) => f,
    Err(e) => {
      eprintln!("Error when opening file {}: {}", path.display(), e);
      process::exit(1);
    }
  };
  let reader = match SerializedFileReader::new(file) {
    Ok(reader) => reader,
    Err(e) => {
      eprintln!("Error when parsing Parquet file: {}", e);
      process::exit(1);
    }
  };
  println!("Metadata for file: {}", &args[1]);
  println!();
  if let Err(e) = print_metadata(&mut io::stdout(), reader.metadata(), verbose) {
    eprintln!("Error when printing metadata: {}", e);
    process::exit(1);
  }
}

fn print_metadata(out: &mut dyn Write, metadata: &ParquetMetaData, verbose: bool) -> Result<()> {
  let file_metadata = metadata.file_metadata();
  writeln!(out, "num of rows: {}", file_metadata.num_rows())?;
  writeln!(out, "created by: {}", file_metadata.created_by())?;
  writeln!(out, "{}", file_metadata.schema())?;
  if !verbose {
    return Ok(());
  }
  writeln!(out, "num of row groups: {}", metadata.num_row_groups())?;
  for (i, row_group) in metadata.row_groups().iter().enumerate() {
    writeln!(out)?;
    writeln!(out, "row group {}:", i)?;
    writeln!(out, "  num of rows: {}", row_group.num_rows())?;
    writeln!(out, "  total byte size: {}", row_group.total_byte_size())?;
    for column in row_group.columns() {
      writeln!(out, "  column '{}':", column.column_path())?;
      writeln!(out, "    type: {}", column.column_type())?;
      writeln!(out, "    compression: {}", column.compression())?;
      writeln!(out, "    num of values: {}", column.num_values())?;
      writeln!(out, "    num of pages: {}", column.num_pages())?;
      writeln!(out, "    data page offset: {}", column.data_page_offset())?;
      writeln!(out, "    compressed size: {}", column.compressed_size())?;
      writeln!(out, "    uncompressed size: {}", column.uncompressed_size())?;
    }
  }
  Ok(())
}
