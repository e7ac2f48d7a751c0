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

use tracing::debug;
use tracing::trace;

use crate::common::QuantileSketch;
use crate::error::Error;
use crate::tdigest::Centroid;
use crate::tdigest::Invariant;
use crate::tdigest::scan::scan_quantiles;

/// Smoothing factor of the elements-reduced moving average.
const REDUCTION_EMA: f32 = 0.97;

/// Compression counters, for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompressionStats {
    /// Number of compression passes.
    pub compressions: u64,
    /// Number of passes that fell back to unconditional pairwise merging.
    pub brute_compressions: u64,
    /// Moving average of the room freed by a compression pass.
    pub elements_reduced: f32,
}

/// Fixed-capacity t-digest.
///
/// See [`crate::tdigest`] for an overview.
#[derive(Debug, Clone)]
pub struct TDigest {
    centroids: Vec<Centroid>,
    capacity: usize,
    sorted: bool,
    invariant: Invariant,
    decay: f32,
    stats: CompressionStats,
}

impl TDigest {
    /// Creates a digest holding at most `capacity` centroids. 512 is a good size to start with.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is odd or zero, or if the invariant's accuracy is not positive.
    pub fn new(invariant: Invariant, capacity: usize) -> Self {
        Self::try_new(invariant, capacity).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Creates a digest, rejecting an odd or zero `capacity` and a non-positive accuracy.
    pub fn try_new(invariant: Invariant, capacity: usize) -> Result<Self, Error> {
        Self::builder(invariant, capacity).build()
    }

    /// Creates a digest with [`Invariant::HighBias`].
    ///
    /// # Panics
    ///
    /// See [`TDigest::new`].
    pub fn high_biased(eps: f64, capacity: usize) -> Self {
        Self::new(Invariant::HighBias(eps), capacity)
    }

    /// Creates a digest with [`Invariant::LowBias`].
    ///
    /// # Panics
    ///
    /// See [`TDigest::new`].
    pub fn low_biased(eps: f64, capacity: usize) -> Self {
        Self::new(Invariant::LowBias(eps), capacity)
    }

    /// Creates a digest with [`Invariant::ExtremesBias`].
    ///
    /// # Panics
    ///
    /// See [`TDigest::new`].
    pub fn extremes_biased(eps: f64, capacity: usize) -> Self {
        Self::new(Invariant::ExtremesBias(eps), capacity)
    }

    /// Returns a builder for a digest with optional settings such as decay.
    pub fn builder(invariant: Invariant, capacity: usize) -> TDigestBuilder {
        TDigestBuilder {
            invariant,
            capacity,
            decay: 1.0,
        }
    }

    /// Returns the maximum number of centroids.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of centroids currently held.
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    /// Returns true if the digest holds no centroids.
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Returns the sum of centroid weights.
    pub fn total_weight(&self) -> f64 {
        self.centroids.iter().map(|c| f64::from(c.weight())).sum()
    }

    /// Returns the centroids in their current order.
    ///
    /// They are in ascending value order when [`TDigest::is_sorted`] returns true.
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Returns true if the centroids are known to be in ascending value order.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Returns the error-budget policy.
    pub fn invariant(&self) -> Invariant {
        self.invariant
    }

    /// Returns the decay factor applied after each full compression cycle.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Returns the compression counters.
    pub fn stats(&self) -> CompressionStats {
        self.stats
    }

    /// Adds a value with unit weight.
    pub fn insert(&mut self, value: f64) {
        self.insert_weighted(value, 1.0);
    }

    /// Adds a value with the given weight, compressing first if the digest is full.
    ///
    /// NaN values and weights that are not positive and finite are ignored.
    pub fn insert_weighted(&mut self, value: f64, weight: f32) {
        if value.is_nan() || !(weight > 0.0 && weight.is_finite()) {
            return;
        }
        if self.centroids.len() == self.capacity {
            self.compress();
        }
        self.sorted = match self.centroids.last() {
            None => true,
            Some(last) => self.sorted && value >= last.value(),
        };
        self.centroids.push(Centroid::new(value, weight));
    }

    /// Returns the estimated value at quantile `q`, or `0.0` if the digest is empty.
    pub fn query(&mut self, q: f64) -> f64 {
        let mut out = [0.0];
        self.query_multi(&[q], &mut out);
        out[0]
    }

    /// Answers several quantiles in one pass; `out[i]` receives the estimate for `qs[i]`.
    ///
    /// # Panics
    ///
    /// Panics if `qs` and `out` have different lengths.
    pub fn query_multi(&mut self, qs: &[f64], out: &mut [f64]) {
        assert_eq!(qs.len(), out.len(), "qs and out must have the same length");
        self.sort();
        let (Some(first), Some(last)) = (self.centroids.first(), self.centroids.last()) else {
            out.fill(0.0);
            return;
        };
        let (min, max) = (first.value(), last.value());
        scan_quantiles(
            self.centroids.iter().copied(),
            self.total_weight(),
            min,
            max,
            qs,
            out,
        );
    }

    /// Merges `other` into this digest, scaling existing weights by `w0` and the weights of
    /// `other` by `w1`.
    ///
    /// Centroids of `other` enter through the bounded insert path, so compression happens as
    /// the array fills up. Both factors must be positive and finite.
    pub fn merge(&mut self, other: &TDigest, w0: f32, w1: f32) -> Result<(), Error> {
        for (name, factor) in [("w0", w0), ("w1", w1)] {
            if !(factor > 0.0 && factor.is_finite()) {
                return Err(
                    Error::invalid_argument("merge weight factors must be positive and finite")
                        .with_context(name, factor),
                );
            }
        }
        if w0 != 1.0 {
            self.centroids.iter_mut().for_each(|c| c.scale(w0));
        }
        for c in &other.centroids {
            self.insert_weighted(c.value(), c.weight() * w1);
        }
        Ok(())
    }

    /// Sorts and compresses the centroids now.
    ///
    /// This runs the greedy budget-driven pass, and when that pass frees no room it merges
    /// neighbouring pairs unconditionally and then applies decay.
    pub fn compress(&mut self) {
        if self.centroids.is_empty() {
            return;
        }
        self.sort();

        let before = self.centroids.len();
        self.compress_light();
        let after = self.centroids.len();
        self.stats.compressions += 1;
        self.stats.elements_reduced = self.stats.elements_reduced * REDUCTION_EMA
            + (self.capacity - after) as f32 * (1.0 - REDUCTION_EMA);
        trace!(before, after, "compressed digest");

        if after != self.capacity {
            return;
        }

        debug!(
            capacity = self.capacity,
            "budget pass freed no room, merging neighbouring pairs"
        );
        self.compress_brute();
        self.stats.brute_compressions += 1;

        if self.decay != 1.0 {
            debug!(decay = self.decay, "decaying digest weights");
            let decay = self.decay;
            self.centroids.iter_mut().for_each(|c| c.scale(decay));
        }
    }

    /// Resets the digest to an empty state. Compression counters are kept.
    pub fn reset(&mut self) {
        self.centroids.clear();
        self.sorted = true;
    }

    fn sort(&mut self) {
        if !self.sorted {
            self.centroids.sort_unstable_by(|a, b| a.value().total_cmp(&b.value()));
            self.sorted = true;
        }
    }

    /// Single greedy pass merging each centroid into its left neighbour while the pair fits
    /// the invariant's budget at both of their quantile positions.
    fn compress_light(&mut self) {
        let total = self.total_weight();
        let cs = &mut self.centroids;
        let n = cs.len();
        let mut l = 0;
        let mut sum = 0.0;
        for r in 1..n {
            let wl = f64::from(cs[l].weight());
            let wr = f64::from(cs[r].weight());
            let ql = (sum + wl * 0.5) / total;
            let qr = (sum + wl + wr * 0.5) / total;
            let budget = self.invariant.bound(ql).min(self.invariant.bound(qr)) * total;

            if wl + wr <= budget && cs[l].can_merge(&cs[r]) {
                let right = cs[r];
                cs[l].merge(&right);
            } else {
                sum += wl;
                l += 1;
                if l != r {
                    cs[l] = cs[r];
                }
            }
        }
        cs.truncate(l + 1);
    }

    /// Merges disjoint neighbouring pairs, halving the number of centroids.
    fn compress_brute(&mut self) {
        let n = self.centroids.len();
        debug_assert!(n % 2 == 0, "brute compression needs an even count, got {n}");
        for i in 0..n / 2 {
            let mut merged = self.centroids[2 * i];
            merged.merge(&self.centroids[2 * i + 1]);
            self.centroids[i] = merged;
        }
        self.centroids.truncate(n / 2);
    }
}

/// Builder for [`TDigest`].
#[derive(Debug, Clone)]
pub struct TDigestBuilder {
    invariant: Invariant,
    capacity: usize,
    decay: f32,
}

impl TDigestBuilder {
    /// Sets the factor applied to all weights after each full compression cycle.
    ///
    /// Values below one age out past mass, biasing estimates toward recent data.
    pub fn decay(mut self, decay: f32) -> Self {
        self.decay = decay;
        self
    }

    /// Builds the digest, validating the configuration.
    pub fn build(self) -> Result<TDigest, Error> {
        if self.capacity == 0 || self.capacity % 2 != 0 {
            return Err(Error::invalid_argument("capacity must be even and positive")
                .with_context("capacity", self.capacity));
        }
        self.invariant.validate()?;
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(Error::invalid_argument("decay must be in (0, 1]")
                .with_context("decay", self.decay));
        }
        Ok(TDigest {
            centroids: Vec::with_capacity(self.capacity),
            capacity: self.capacity,
            sorted: true,
            invariant: self.invariant,
            decay: self.decay,
            stats: CompressionStats::default(),
        })
    }
}

impl QuantileSketch for TDigest {
    fn insert(&mut self, value: f64) {
        TDigest::insert(self, value);
    }

    fn query(&mut self, q: f64) -> f64 {
        TDigest::query(self, q)
    }

    fn query_multi(&mut self, qs: &[f64], out: &mut [f64]) {
        TDigest::query_multi(self, qs, out);
    }
}

impl fmt::Display for TDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("values: ")?;
        for (i, c) in self.centroids.iter().enumerate() {
            let sep = if i == 0 { "" } else { " " };
            write!(f, "{sep}{:.2}", c.value())?;
        }
        f.write_str("\nweights:")?;
        for c in &self.centroids {
            write!(f, " {:.2}", c.weight())?;
        }
        writeln!(f)
    }
}
