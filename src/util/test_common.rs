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

//! Random data generators for tests.

use rand::distributions::{Alphanumeric, Distribution, Standard};
use rand::{thread_rng, Rng};

use crate::data_type::{ByteArray, Int96};

pub fn random_bytes(n: usize) -> Vec<u8> {
  let mut rng = thread_rng();
  (0..n).map(|_| rng.gen::<u8>()).collect()
}

pub fn random_bools(n: usize) -> Vec<bool> {
  let mut rng = thread_rng();
  (0..n).map(|_| rng.gen::<bool>()).collect()
}

pub fn random_numbers<T>(n: usize) -> Vec<T> where Standard: Distribution<T> {
  let mut rng = thread_rng();
  (0..n).map(|_| rng.gen::<T>()).collect()
}

pub fn random_int96s(n: usize) -> Vec<Int96> {
  let mut rng = thread_rng();
  (0..n).map(|_| Int96::new(rng.gen(), rng.gen(), rng.gen())).collect()
}

/// Generates `n` byte arrays of alphanumeric characters, with lengths in
/// `0..max_len`.
pub fn random_byte_arrays(n: usize, max_len: usize) -> Vec<ByteArray> {
  let mut rng = thread_rng();
  (0..n)
    .map(|_| {
      let len = rng.gen_range(0..max_len.max(1));
      let data: Vec<u8> = (&mut rng).sample_iter(&Alphanumeric).take(len).collect();
      ByteArray::from(data)
    })
    .collect()
}

/// Generates `n` byte arrays of exactly `len` random bytes.
pub fn random_fixed_len_byte_arrays(n: usize, len: usize) -> Vec<ByteArray> {
  (0..n).map(|_| ByteArray::from(random_bytes(len))).collect()
}
