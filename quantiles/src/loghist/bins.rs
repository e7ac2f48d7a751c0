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

//! Sparse, growable bucket storage for one sign of a [`super::LogHistogram`].

use std::iter;

use tracing::trace;

/// Prepended padding is aligned down to a multiple of this many buckets.
const GROW_ALIGN: i64 = 8;

/// Contiguous run of bucket weights starting at bucket key `offset`.
#[derive(Debug, Clone, Default)]
pub(super) struct Bins {
    weights: Vec<f32>,
    offset: i64,
    total: f64,
}

impl Bins {
    /// Adds `weight` to bucket `key`, growing the run to cover it.
    pub fn add(&mut self, key: i64, weight: f32) {
        if self.weights.is_empty() {
            self.offset = key;
        }
        if key < self.offset {
            let low = key & !(GROW_ALIGN - 1);
            let pad = (self.offset - low) as usize;
            trace!(key, pad, "growing bins downwards");
            self.weights.splice(0..0, iter::repeat_n(0.0, pad));
            self.offset = low;
        }
        let index = (key - self.offset) as usize;
        if index >= self.weights.len() {
            trace!(key, len = index + 1, "growing bins upwards");
            self.weights.resize(index + 1, 0.0);
        }
        self.weights[index] += weight;
        self.total += f64::from(weight);
    }

    /// Total weight across all buckets.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0.0
    }

    /// Buckets as `(key, weight)` in ascending key order, including zero-weight padding.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (i64, f32)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, &w)| (self.offset + i as i64, w))
    }

    /// Lowest key holding weight.
    pub fn first_key(&self) -> Option<i64> {
        self.iter().find(|&(_, w)| w > 0.0).map(|(key, _)| key)
    }

    /// Highest key holding weight.
    pub fn last_key(&self) -> Option<i64> {
        self.iter().rev().find(|&(_, w)| w > 0.0).map(|(key, _)| key)
    }

    pub fn clear(&mut self) {
        self.weights.clear();
        self.offset = 0;
        self.total = 0.0;
    }
}
