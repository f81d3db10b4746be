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

//! Writer properties.
//!
//! # Usage
//!
//! ```rust
//! use parquet_shred::basic::Compression;
//! use parquet_shred::file::properties::WriterProperties;
//!
//! // Create properties with default configuration.
//! let props = WriterProperties::builder().build();
//!
//! // Use properties builder to set certain options and assemble the configuration.
//! let props = WriterProperties::builder()
//!   .set_compression(Compression::SNAPPY)
//!   .set_data_page_row_limit(1000)
//!   .build();
//!
//! assert_eq!(props.compression(), Compression::SNAPPY);
//! assert_eq!(props.data_page_row_limit(), 1000);
//! ```

use std::sync::Arc;

use crate::basic::Compression;

const DEFAULT_COMPRESSION: Compression = Compression::UNCOMPRESSED;
const DEFAULT_DATA_PAGE_ROW_LIMIT: usize = 20_000;
const DEFAULT_CREATED_BY: &str = concat!("parquet-shred version ", env!("CARGO_PKG_VERSION"));

/// Reference counted writer properties.
pub type WriterPropertiesPtr = Arc<WriterProperties>;

/// Writer properties.
///
/// It is created as an immutable data structure, use [`WriterPropertiesBuilder`] to
/// assemble the properties.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterProperties {
  compression: Compression,
  data_page_row_limit: usize,
  created_by: String
}

impl WriterProperties {
  /// Returns builder for writer properties with default values.
  pub fn builder() -> WriterPropertiesBuilder {
    WriterPropertiesBuilder::with_defaults()
  }

  /// Codec applied to every page payload.
  pub fn compression(&self) -> Compression {
    self.compression
  }

  /// Maximum number of rows in a data page. Pages always end on a row boundary.
  pub fn data_page_row_limit(&self) -> usize {
    self.data_page_row_limit
  }

  /// Returns `created_by` string, recorded in the file footer.
  pub fn created_by(&self) -> &str {
    &self.created_by
  }
}

impl Default for WriterProperties {
  fn default() -> Self {
    Self::builder().build()
  }
}

/// Writer properties builder.
pub struct WriterPropertiesBuilder {
  compression: Compression,
  data_page_row_limit: usize,
  created_by: String
}

impl WriterPropertiesBuilder {
  fn with_defaults() -> Self {
    Self {
      compression: DEFAULT_COMPRESSION,
      data_page_row_limit: DEFAULT_DATA_PAGE_ROW_LIMIT,
      created_by: DEFAULT_CREATED_BY.to_string()
    }
  }

  /// Finalizes the configuration and returns immutable writer properties struct.
  pub fn build(self) -> WriterProperties {
    WriterProperties {
      compression: self.compression,
      data_page_row_limit: self.data_page_row_limit,
      created_by: self.created_by
    }
  }

  pub fn set_compression(mut self, value: Compression) -> Self {
    self.compression = value;
    self
  }

  /// Sets the maximum number of rows per data page. Values below 1 are raised to 1.
  pub fn set_data_page_row_limit(mut self, value: usize) -> Self {
    self.data_page_row_limit = value.max(1);
    self
  }

  pub fn set_created_by(mut self, value: String) -> Self {
    self.created_by = value;
    self
  }
}
