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

//! Prints the records of a file, one per line.
//!
//! Usage: `parquet-read <file-path> [num-records]`

use std::env;
use std::fs::File;
use std::path::Path;
use std::process;

use parquet_shred::errors::Result;
use parquet_shred::file::reader::{FileReader, SerializedFileReader};

fn main() {
  let args: Vec<String> = env::args().collect();
  if args.len() != 2 && args.len() != 3 {
    println!("Usage: parquet-read <file-path> [num-records]");
    process::exit(1);
  }
  let num_records = match args.get(2).map(|v| v.parse::<usize>()) {
    None => None,
    Some(Ok(n)) => Some(n),
    Some(Err(e)) => {
      eprintln!("Error when reading value for [num-records], {}", e);
      process::exit(1);
    }
  };
  if let Err(e) = print_records(Path::new(&args[1]), num_records) {
    eprintln!("Error when reading file {}: {}", &args[1], e);
    process::exit(1);
  }
}

fn print_records(path: &Path, num_records: Option<usize>) -> Result<()> {
  let reader = SerializedFileReader::new(File::open(path)?)?;
  let mut remaining = num_records.unwrap_or(usize::MAX);
  for i in 0..reader.num_row_groups() {
    let row_group = reader.get_row_group(i)?;
    let mut rows = row_group.rows()?;
    while remaining > 0 {
      match rows.read_record() {
        Ok(record) => println!("{}", record),
        Err(ref e) if e.is_eof() => break,
        Err(e) => return Err(e)
      }
      remaining -= 1;
    }
  }
  Ok(())
}
