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

use std::fmt;

use tracing::trace;

use crate::common::QuantileSketch;
use crate::common::weighted_mean;
use crate::error::Error;

/// Stream length the bucket count is tuned for.
const SIZE_HORIZON: f64 = 200_000.0;
/// Upper bound of the rank tolerance added to query targets.
const MAX_QUERY_TOLERANCE: f64 = 0.01;

/// A weighted value held by a [`BiasedStream`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Representative value.
    pub value: f64,
    /// Number of original inserts this sample stands for.
    pub weight: f64,
}

impl Sample {
    /// Creates a new sample.
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// Fixed-capacity biased quantile stream.
///
/// See [`crate::biased`] for an overview.
#[derive(Debug, Clone)]
pub struct BiasedStream {
    samples: Vec<Sample>,
    b: usize,
    epsilon: f64,
    // weight folded into the compressed prefix
    sum: f64,
    // weight appended since the last compression
    add: f64,
    sorted: bool,
}

impl BiasedStream {
    /// Creates a stream for the given epsilon.
    ///
    /// # Panics
    ///
    /// Panics if `epsilon` is not in `(0, 1)`.
    pub fn new(epsilon: f64) -> Self {
        Self::try_new(epsilon).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Creates a stream for the given epsilon, rejecting values outside `(0, 1)`.
    pub fn try_new(epsilon: f64) -> Result<Self, Error> {
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(Error::invalid_argument("epsilon must be in (0, 1)")
                .with_context("epsilon", epsilon));
        }
        let b = (SIZE_HORIZON * epsilon).ln_1p() / epsilon;
        let b = b.ceil() as usize;
        Ok(Self {
            samples: Vec::with_capacity(2 * b),
            b,
            epsilon,
            sum: 0.0,
            add: 0.0,
            sorted: true,
        })
    }

    /// Returns the configured epsilon.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the target number of buckets `b` kept after compression.
    pub fn size(&self) -> usize {
        self.b
    }

    /// Returns the buffer capacity, `2 * b`.
    pub fn buffer_len(&self) -> usize {
        2 * self.b
    }

    /// Returns the number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the total weight of all inserted and merged samples.
    pub fn total_weight(&self) -> f64 {
        self.sum + self.add
    }

    /// Adds one value with unit weight. NaN is ignored.
    pub fn insert(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.samples.push(Sample::new(value, 1.0));
        self.add += 1.0;
        self.sorted = false;
        if self.samples.len() == self.buffer_len() {
            self.compress();
        }
    }

    /// Returns the estimated value at quantile `q`, or `0.0` if the stream is empty.
    pub fn query(&mut self, q: f64) -> f64 {
        if !self.sorted {
            self.compress();
        }
        let Some(last) = self.samples.last() else {
            return 0.0;
        };
        let threshold = q * self.sum + self.epsilon.min(MAX_QUERY_TOLERANCE);
        let mut cum = 0.0;
        for sample in &self.samples {
            cum += sample.weight;
            if cum > threshold {
                return sample.value;
            }
        }
        last.value
    }

    /// Compresses the stream and returns its samples in ascending value order.
    ///
    /// The returned list is what another stream accepts in [`BiasedStream::merge`].
    pub fn samples(&mut self) -> &[Sample] {
        if !self.sorted {
            self.compress();
        }
        &self.samples
    }

    /// Folds a list of weighted samples, typically another stream's
    /// [`BiasedStream::samples`], into this stream.
    ///
    /// Samples with a NaN value or a weight that is not positive are skipped.
    pub fn merge(&mut self, samples: &[Sample]) {
        let before = self.samples.len();
        self.samples.extend(
            samples
                .iter()
                .filter(|s| !s.value.is_nan() && s.weight > 0.0 && s.weight.is_finite()),
        );
        if self.samples.len() == before {
            return;
        }
        self.add += self.samples[before..].iter().map(|s| s.weight).sum::<f64>();
        self.sorted = false;
        self.compress();
    }

    /// Resets the stream to an empty state.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
        self.add = 0.0;
        self.sorted = true;
    }

    fn compress(&mut self) {
        self.samples.sort_unstable_by(|a, b| a.value.total_cmp(&b.value));
        let n = self.samples.len();
        if n <= self.b {
            self.sum += self.add;
            self.add = 0.0;
            self.sorted = true;
            return;
        }

        let total = self.sum + self.add;
        let step = total / self.b as f64;
        let mut target = 0.0;
        let mut cum = 0.0;
        let mut read = 0;
        let mut write = 0;
        for bucket in 0..self.b {
            if read == n {
                break;
            }
            target += step;
            let last_bucket = bucket + 1 == self.b;
            let mut acc = Sample::new(0.0, 0.0);
            while read < n && (last_bucket || cum < target) {
                let sample = self.samples[read];
                // close the bucket when stopping here lands nearer its boundary
                if !last_bucket && (cum - target).abs() < (cum + sample.weight - target).abs() {
                    break;
                }
                acc.value = if acc.weight == 0.0 {
                    sample.value
                } else {
                    weighted_mean(acc.value, acc.weight, sample.value, sample.weight)
                };
                acc.weight += sample.weight;
                cum += sample.weight;
                read += 1;
            }
            if acc.weight > 0.0 {
                self.samples[write] = acc;
                write += 1;
            }
        }
        trace!(before = n, after = write, step, "compressed biased stream");

        self.samples.truncate(write);
        self.sum = cum;
        self.add = 0.0;
        self.sorted = true;
    }
}

impl QuantileSketch for BiasedStream {
    fn insert(&mut self, value: f64) {
        BiasedStream::insert(self, value);
    }

    fn query(&mut self, q: f64) -> f64 {
        BiasedStream::query(self, q)
    }
}

impl fmt::Display for BiasedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "BiasedStream {}/{}  sum {}",
            self.samples.len(),
            self.b,
            self.total_weight()
        )?;
        let total = self.total_weight();
        let mut cum = 0.0;
        for (i, sample) in self.samples.iter().enumerate() {
            cum += sample.weight;
            writeln!(
                f,
                "  {:4}: {:.4} weight {:.4}  q {:.4}",
                i,
                sample.value,
                sample.weight,
                cum / total
            )?;
        }
        Ok(())
    }
}
