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

use crate::common::QuantileSketch;
use crate::error::Error;
use crate::loghist::bins::Bins;

/// DDSketch-style logarithmic histogram.
///
/// See [`crate::loghist`] for an overview and the accuracy guarantee.
#[derive(Debug, Clone)]
pub struct LogHistogram {
    positive: Bins,
    negative: Bins,
    zeros: f64,
    relative_accuracy: f64,
    gamma: f64,
    multiplier: f64,
    min_possible: f64,
    max_possible: f64,
}

impl LogHistogram {
    /// Creates a histogram with the given relative accuracy.
    ///
    /// # Panics
    ///
    /// Panics if `relative_accuracy` is not in `(0, 1)`.
    pub fn new(relative_accuracy: f64) -> Self {
        Self::try_new(relative_accuracy).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Creates a histogram, rejecting a relative accuracy outside `(0, 1)`.
    pub fn try_new(relative_accuracy: f64) -> Result<Self, Error> {
        if !(relative_accuracy > 0.0 && relative_accuracy < 1.0) {
            return Err(Error::invalid_argument("relative accuracy must be in (0, 1)")
                .with_context("relative_accuracy", relative_accuracy));
        }
        let gamma = (1.0 + relative_accuracy) / (1.0 - relative_accuracy);
        Ok(Self {
            positive: Bins::default(),
            negative: Bins::default(),
            zeros: 0.0,
            relative_accuracy,
            gamma,
            multiplier: 1.0 / gamma.ln(),
            min_possible: f64::MIN_POSITIVE * gamma,
            max_possible: f64::MAX / gamma,
        })
    }

    /// Returns the configured relative accuracy.
    pub fn relative_accuracy(&self) -> f64 {
        self.relative_accuracy
    }

    /// Returns the bucket growth factor `(1 + a) / (1 - a)`.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Returns the total inserted weight, zeros included.
    pub fn total_weight(&self) -> f64 {
        self.negative.total() + self.zeros + self.positive.total()
    }

    /// Returns true if no weight has been inserted.
    pub fn is_empty(&self) -> bool {
        self.total_weight() == 0.0
    }

    /// Adds one value with unit weight.
    pub fn insert(&mut self, value: f64) {
        self.insert_weighted(value, 1.0);
    }

    /// Adds a value with the given weight.
    ///
    /// NaN values and weights that are not positive and finite are ignored. Magnitudes below
    /// the smallest representable bucket count as zero; magnitudes above the largest one,
    /// infinities included, land in the top bucket.
    pub fn insert_weighted(&mut self, value: f64, weight: f32) {
        if value.is_nan() || !(weight > 0.0 && weight.is_finite()) {
            return;
        }
        let magnitude = value.abs();
        if magnitude < self.min_possible {
            self.zeros += f64::from(weight);
            return;
        }
        let key = self.key(magnitude.min(self.max_possible));
        let bins = if value < 0.0 {
            &mut self.negative
        } else {
            &mut self.positive
        };
        bins.add(key, weight);
    }

    /// Returns the estimated value at quantile `q`, or `0.0` if the histogram is empty.
    pub fn query(&self, q: f64) -> f64 {
        let total = self.total_weight();
        if total == 0.0 {
            return 0.0;
        }
        if q <= 0.0 {
            return if let Some(key) = self.negative.last_key() {
                -self.unkey(key)
            } else if self.zeros > 0.0 {
                0.0
            } else {
                self.positive.first_key().map_or(0.0, |key| self.unkey(key))
            };
        }
        if q >= 1.0 {
            return if let Some(key) = self.positive.last_key() {
                self.unkey(key)
            } else if self.zeros > 0.0 {
                0.0
            } else {
                self.negative.first_key().map_or(0.0, |key| -self.unkey(key))
            };
        }

        let target = q * total;
        if target < self.negative.total() {
            // walk from the most negative bucket towards zero
            let mut cum = 0.0;
            for (key, weight) in self.negative.iter().rev() {
                cum += f64::from(weight);
                if cum > target {
                    return -self.unkey(key);
                }
            }
            self.negative.first_key().map_or(0.0, |key| -self.unkey(key))
        } else if total - target <= self.positive.total() {
            let limit = target - (self.negative.total() + self.zeros);
            let mut cum = 0.0;
            for (key, weight) in self.positive.iter() {
                cum += f64::from(weight);
                if cum > limit {
                    return self.unkey(key);
                }
            }
            self.positive.last_key().map_or(0.0, |key| self.unkey(key))
        } else {
            0.0
        }
    }

    /// Merges another histogram into this one.
    ///
    /// Both histograms must have been created with the same relative accuracy.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.relative_accuracy != other.relative_accuracy {
            return Err(
                Error::incompatible("cannot merge histograms with different relative accuracy")
                    .with_context("self", self.relative_accuracy)
                    .with_context("other", other.relative_accuracy),
            );
        }
        self.zeros += other.zeros;
        for (key, weight) in other.positive.iter().filter(|&(_, w)| w > 0.0) {
            self.positive.add(key, weight);
        }
        for (key, weight) in other.negative.iter().filter(|&(_, w)| w > 0.0) {
            self.negative.add(key, weight);
        }
        Ok(())
    }

    /// Resets the histogram to an empty state.
    pub fn reset(&mut self) {
        self.positive.clear();
        self.negative.clear();
        self.zeros = 0.0;
    }

    fn key(&self, magnitude: f64) -> i64 {
        (magnitude.ln() * self.multiplier).floor() as i64
    }

    /// Representative magnitude of bucket `key`.
    fn unkey(&self, key: i64) -> f64 {
        (key as f64 / self.multiplier).exp() * (1.0 + self.relative_accuracy)
    }

    fn fmt_bins(&self, f: &mut fmt::Formatter<'_>, bins: &Bins) -> fmt::Result {
        for (key, weight) in bins.iter().filter(|&(_, w)| w > 0.0) {
            writeln!(
                f,
                "  key {:4}  value {:.3}  weight {:.1}",
                key,
                self.unkey(key),
                weight
            )?;
        }
        Ok(())
    }
}

impl QuantileSketch for LogHistogram {
    fn insert(&mut self, value: f64) {
        LogHistogram::insert(self, value);
    }

    fn query(&mut self, q: f64) -> f64 {
        LogHistogram::query(self, q)
    }
}

impl fmt::Display for LogHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "totals (neg+zero+pos): {:.2} + {:.2} + {:.2}",
            self.negative.total(),
            self.zeros,
            self.positive.total()
        )?;
        if !self.negative.is_empty() {
            writeln!(f, "negative (offset {})", self.negative.offset())?;
            self.fmt_bins(f, &self.negative)?;
        }
        if !self.positive.is_empty() {
            writeln!(f, "positive (offset {})", self.positive.offset())?;
            self.fmt_bins(f, &self.positive)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let sketch = LogHistogram::new(0.01);
        for key in -50..50 {
            assert_eq!(sketch.key(sketch.unkey(key)), key);
        }
    }

    #[test]
    fn test_representative_within_relative_accuracy() {
        let sketch = LogHistogram::new(0.01);
        let mut v = 1e-6;
        while v < 1e6 {
            let rep = sketch.unkey(sketch.key(v));
            assert!((rep - v).abs() <= 0.01 * v * (1.0 + 1e-9), "{v} -> {rep}");
            v *= 1.037;
        }
    }

    #[test]
    fn test_tiny_and_huge_magnitudes() {
        let mut sketch = LogHistogram::new(0.05);
        sketch.insert(0.0);
        sketch.insert(-0.0);
        sketch.insert(f64::MIN_POSITIVE / 4.0);
        assert_eq!(sketch.zeros, 3.0);
        sketch.insert(f64::INFINITY);
        assert!(sketch.query(1.0).is_finite());
        assert_eq!(sketch.total_weight(), 4.0);
    }
}
