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

//! Codecs applied to page payloads.
//!
//! A codec is selected per file through
//! [`WriterProperties`](crate::file::properties::WriterProperties) and recorded in the
//! metadata of every column chunk, so readers can pick the matching codec with
//! [`create_codec`].

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression as GzLevel;
use snap::raw::{decompress_len, Decoder, Encoder};

use crate::basic::Compression as CodecType;
use crate::errors::{ParquetError, Result};

/// Compression and decompression of byte buffers.
pub trait Codec {
  /// Compresses `input_buf` and appends the result to `output_buf`.
  fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()>;

  /// Decompresses `input_buf` and appends the result to `output_buf`. Returns the number
  /// of bytes appended.
  fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize>;
}

/// Given the compression type `codec`, returns a codec used to compress and decompress
/// bytes for the compression type. Returns `None` if the codec type is `UNCOMPRESSED`.
pub fn create_codec(codec: CodecType) -> Result<Option<Box<dyn Codec>>> {
  match codec {
    CodecType::BROTLI => Ok(Some(Box::new(BrotliCodec::new()))),
    CodecType::GZIP => Ok(Some(Box::new(GZipCodec::new()))),
    CodecType::SNAPPY => Ok(Some(Box::new(SnappyCodec::new()))),
    CodecType::UNCOMPRESSED => Ok(None),
    _ => Err(nyi_err!("The codec type {} is not supported yet", codec))
  }
}

pub struct SnappyCodec {
  decoder: Decoder,
  encoder: Encoder
}

impl SnappyCodec {
  fn new() -> Self {
    Self { decoder: Decoder::new(), encoder: Encoder::new() }
  }
}

impl Codec for SnappyCodec {
  fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
    let compressed = self
      .encoder
      .compress_vec(input_buf)
      .map_err(|e| general_err!("Error when compressing using Snappy: {}", e))?;
    output_buf.extend_from_slice(&compressed);
    Ok(())
  }

  fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize> {
    let len = decompress_len(input_buf)
      .map_err(|e| general_err!("Error when decompressing using Snappy: {}", e))?;
    let offset = output_buf.len();
    output_buf.resize(offset + len, 0);
    self
      .decoder
      .decompress(input_buf, &mut output_buf[offset..])
      .map_err(|e| general_err!("Error when decompressing using Snappy: {}", e))
  }
}

pub struct GZipCodec {}

impl GZipCodec {
  fn new() -> Self {
    Self {}
  }
}

impl Codec for GZipCodec {
  fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
    let mut encoder = GzEncoder::new(output_buf, GzLevel::default());
    encoder.write_all(input_buf)?;
    encoder
      .try_finish()
      .map_err(|e| general_err!("Error when compressing using GZip: {}", e))
  }

  fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize> {
    GzDecoder::new(input_buf)
      .read_to_end(output_buf)
      .map_err(|e| general_err!("Error when decompressing using GZip: {}", e))
  }
}

const BROTLI_DEFAULT_BUFFER_SIZE: usize = 4096;
const BROTLI_DEFAULT_COMPRESSION_QUALITY: u32 = 9; // supported levels 0-9
const BROTLI_DEFAULT_LG_WINDOW_SIZE: u32 = 22; // recommended between 20-22

pub struct BrotliCodec {}

impl BrotliCodec {
  fn new() -> Self {
    Self {}
  }
}

impl Codec for BrotliCodec {
  fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
    brotli::CompressorReader::new(
      input_buf,
      BROTLI_DEFAULT_BUFFER_SIZE,
      BROTLI_DEFAULT_COMPRESSION_QUALITY,
      BROTLI_DEFAULT_LG_WINDOW_SIZE
    )
    .read_to_end(output_buf)
    .map_err(|e| general_err!("Error when compressing using Brotli: {}", e))?;
    Ok(())
  }

  fn decompress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<usize> {
    brotli::Decompressor::new(input_buf, BROTLI_DEFAULT_BUFFER_SIZE)
      .read_to_end(output_buf)
      .map_err(|e| general_err!("Error when decompressing using Brotli: {}", e))
  }
}
