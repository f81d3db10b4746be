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

//! PLAIN encoding of page payloads.
//!
//! A payload is the repetition levels, one byte per slot, if the column is repeated;
//! then the definition levels, one byte per slot, if the column is nullable; then the
//! non-null values:
//!
//! * BOOLEAN: bit-packed, least significant bit first;
//! * INT32, INT64, FLOAT, DOUBLE: little-endian;
//! * INT96: three little-endian 32-bit words;
//! * BYTE_ARRAY: 4-byte little-endian length, followed by the bytes;
//! * FIXED_LEN_BYTE_ARRAY: the bytes, the length being the column's type length.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::column::page::{Page, ValueBuffer, BYTE_ARRAY_LENGTH_SIZE};
use crate::data_type::{ByteArray, Int96};
use crate::errors::{ParquetError, Result};
use crate::schema::types::ColumnDescPtr;
use crate::util::bit_util;

/// Appends the PLAIN encoding of `page` to `out`.
pub fn encode_page(page: &Page, out: &mut Vec<u8>) -> Result<()> {
  out.extend_from_slice(page.rep_levels());
  out.extend_from_slice(page.def_levels());
  match *page.buffer() {
    ValueBuffer::Boolean(ref values) => bit_util::pack_bools(values, out),
    ValueBuffer::Int32(ref values) => {
      for &v in values {
        out.write_i32::<LittleEndian>(v)?;
      }
    },
    ValueBuffer::Int64(ref values) => {
      for &v in values {
        out.write_i64::<LittleEndian>(v)?;
      }
    },
    ValueBuffer::Int96(ref values) => {
      for v in values {
        out.extend_from_slice(&v.to_bytes());
      }
    },
    ValueBuffer::Float(ref values) => {
      for &v in values {
        out.write_f32::<LittleEndian>(v)?;
      }
    },
    ValueBuffer::Double(ref values) => {
      for &v in values {
        out.write_f64::<LittleEndian>(v)?;
      }
    },
    ValueBuffer::ByteArray(ref values) => {
      for v in values {
        out.write_u32::<LittleEndian>(v.len() as u32)?;
        out.extend_from_slice(v.data());
      }
    },
    ValueBuffer::FixedLenByteArray(ref values) => {
      for v in values {
        out.extend_from_slice(v.data());
      }
    }
  }
  Ok(())
}

/// Decodes a PLAIN payload of `num_values` slots, `num_nulls` of them null, into a
/// page of the column `descr`.
pub fn decode_page(
  descr: ColumnDescPtr,
  data: &[u8],
  num_values: usize,
  num_nulls: usize
) -> Result<Page> {
  if num_nulls > num_values {
    return Err(general_err!("Page has {} nulls but only {} values", num_nulls, num_values));
  }
  let mut decoder = PlainDecoder { data, start: 0 };
  let rep_levels = if descr.max_rep_level() > 0 {
    decoder.take(num_values)?.to_vec()
  } else {
    vec![]
  };
  let def_levels = if descr.max_def_level() > 0 {
    decoder.take(num_values)?.to_vec()
  } else {
    vec![]
  };
  let values = decoder.decode_values(&descr, num_values - num_nulls)?;
  if decoder.start != data.len() {
    return Err(general_err!(
      "{} trailing bytes after page values", data.len() - decoder.start
    ));
  }
  Page::new(descr, values, def_levels, rep_levels)
}

struct PlainDecoder<'a> {
  data: &'a [u8],
  // The current starting index in `data`
  start: usize
}

impl<'a> PlainDecoder<'a> {
  fn take(&mut self, n: usize) -> Result<&'a [u8]> {
    if self.data.len() - self.start < n {
      return Err(general_err!("Not enough bytes to decode"));
    }
    let bytes = &self.data[self.start..self.start + n];
    self.start += n;
    Ok(bytes)
  }

  fn take_fixed(&mut self, n: usize, width: usize) -> Result<&'a [u8]> {
    let len = n.checked_mul(width).ok_or_else(|| general_err!("Not enough bytes to decode"))?;
    self.take(len)
  }

  fn decode_values(&mut self, descr: &ColumnDescPtr, n: usize) -> Result<ValueBuffer> {
    let values = match ValueBuffer::new(descr.physical_type()) {
      ValueBuffer::Boolean(_) => {
        let bytes = self.take(bit_util::ceil(n, 8))?;
        let values = bit_util::unpack_bools(bytes, n)
          .ok_or_else(|| general_err!("Not enough bytes to decode"))?;
        ValueBuffer::Boolean(values)
      },
      ValueBuffer::Int32(_) => {
        let bytes = self.take_fixed(n, 4)?;
        let mut values = vec![0; bytes.len() / 4];
        LittleEndian::read_i32_into(bytes, &mut values);
        ValueBuffer::Int32(values)
      },
      ValueBuffer::Int64(_) => {
        let bytes = self.take_fixed(n, 8)?;
        let mut values = vec![0; bytes.len() / 8];
        LittleEndian::read_i64_into(bytes, &mut values);
        ValueBuffer::Int64(values)
      },
      ValueBuffer::Int96(_) => {
        let bytes = self.take_fixed(n, 12)?;
        let values = bytes
          .chunks_exact(12)
          .map(|b| {
            Int96::new(
              LittleEndian::read_u32(&b[0..4]),
              LittleEndian::read_u32(&b[4..8]),
              LittleEndian::read_u32(&b[8..12])
            )
          })
          .collect();
        ValueBuffer::Int96(values)
      },
      ValueBuffer::Float(_) => {
        let bytes = self.take_fixed(n, 4)?;
        let mut values = vec![0.0; bytes.len() / 4];
        LittleEndian::read_f32_into(bytes, &mut values);
        ValueBuffer::Float(values)
      },
      ValueBuffer::Double(_) => {
        let bytes = self.take_fixed(n, 8)?;
        let mut values = vec![0.0; bytes.len() / 8];
        LittleEndian::read_f64_into(bytes, &mut values);
        ValueBuffer::Double(values)
      },
      ValueBuffer::ByteArray(_) => {
        // Every value takes at least its length prefix
        let remaining = (self.data.len() - self.start) / BYTE_ARRAY_LENGTH_SIZE;
        let mut values = Vec::with_capacity(n.min(remaining));
        for _ in 0..n {
          let len = LittleEndian::read_u32(self.take(4)?) as usize;
          values.push(ByteArray::from(self.take(len)?));
        }
        ValueBuffer::ByteArray(values)
      },
      ValueBuffer::FixedLenByteArray(_) => {
        let type_length = descr.type_length() as usize;
        let bytes = self.take_fixed(n, type_length)?;
        ValueBuffer::FixedLenByteArray(bytes.chunks_exact(type_length).map(ByteArray::from).collect())
      }
    };
    Ok(values)
  }
}
