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

//! Bit level helpers for bit-packed boolean values.

/// Returns the ceil of `value / divisor`.
#[inline]
pub fn ceil(value: usize, divisor: usize) -> usize {
  value / divisor + ((value % divisor != 0) as usize)
}

#[inline]
pub fn get_array_bit(bits: &[u8], i: usize) -> bool {
  bits[i / 8] & (1 << (i % 8)) != 0
}

#[inline]
pub fn set_array_bit(bits: &mut [u8], i: usize) {
  bits[i / 8] |= 1 << (i % 8);
}

#[inline]
pub fn unset_array_bit(bits: &mut [u8], i: usize) {
  bits[i / 8] &= !(1 << (i % 8));
}

/// Packs `values` one bit each, least significant bit first, and appends the bytes to
/// `dst`.
pub fn pack_bools(values: &[bool], dst: &mut Vec<u8>) {
  let offset = dst.len();
  dst.resize(offset + ceil(values.len(), 8), 0);
  for (i, &v) in values.iter().enumerate() {
    if v {
      set_array_bit(&mut dst[offset..], i);
    }
  }
}

/// Unpacks `num_values` bit-packed values from `src`. Returns `None` if `src` is too
/// short.
pub fn unpack_bools(src: &[u8], num_values: usize) -> Option<Vec<bool>> {
  if src.len() < ceil(num_values, 8) {
    return None;
  }
  Some((0..num_values).map(|i| get_array_bit(src, i)).collect())
}
