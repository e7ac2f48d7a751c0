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

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::common::QuantileSketch;
use crate::error::Error;

const MAX_BISECT_STEPS: usize = 20;

#[derive(Debug, Clone)]
struct Level {
    values: Vec<f64>,
    sorted: bool,
}

impl Level {
    fn new(width: usize) -> Self {
        Self {
            values: Vec::with_capacity(width),
            sorted: true,
        }
    }

    fn sort(&mut self) {
        if !self.sorted {
            self.values.sort_unstable_by(f64::total_cmp);
            self.sorted = true;
        }
    }
}

/// KLL-style leveled compaction sketch.
///
/// See [`crate::kll`] for an overview.
#[derive(Debug, Clone)]
pub struct LeveledSketch {
    levels: Vec<Level>,
    width: usize,
}

impl LeveledSketch {
    /// Creates a sketch with `depth` levels of `width` values each.
    ///
    /// # Panics
    ///
    /// Panics if `width` is odd or zero, or if `depth` is zero.
    pub fn new(width: usize, depth: usize) -> Self {
        Self::try_new(width, depth).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Creates a sketch, rejecting an odd or zero `width` and a zero `depth`.
    pub fn try_new(width: usize, depth: usize) -> Result<Self, Error> {
        if width == 0 || width % 2 != 0 {
            return Err(Error::invalid_argument("width must be even and positive")
                .with_context("width", width));
        }
        if depth == 0 {
            return Err(
                Error::invalid_argument("depth must be positive").with_context("depth", depth),
            );
        }
        Ok(Self {
            levels: (0..depth).map(|_| Level::new(width)).collect(),
            width,
        })
    }

    /// Returns the capacity of each level.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Returns the number of values stored across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(|l| l.values.len()).sum()
    }

    /// Returns the number of values stored at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= depth`.
    pub fn level_len(&self, level: usize) -> usize {
        self.levels[level].values.len()
    }

    /// Returns true if the sketch holds no values.
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(|l| l.values.is_empty())
    }

    /// Adds a value to level 0, compacting first if the level is full. NaN is ignored.
    pub fn insert(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if self.levels[0].values.len() == self.width {
            self.compact(0);
        }
        let level = &mut self.levels[0];
        level.sorted = match level.values.last() {
            None => true,
            Some(&last) => level.sorted && value >= last,
        };
        level.values.push(value);
    }

    /// Returns the estimated value at quantile `q`, or `0.0` if the sketch is empty.
    ///
    /// The answer is always a stored value, so it lies within the inserted range and never
    /// decreases as `q` grows.
    pub fn query(&mut self, q: f64) -> f64 {
        let Some((min, max, n)) = self.prepare_query() else {
            return 0.0;
        };
        if q <= 0.0 {
            return min;
        }
        if q >= 1.0 {
            return max;
        }

        let target = ((q * n as f64) as usize).min(n - 1);
        // infinities sit outside the finite range the bisection walks
        if target < self.rank(f64::MIN).0 {
            return f64::NEG_INFINITY;
        }
        if target >= self.rank(f64::INFINITY).0 {
            return f64::INFINITY;
        }
        let (Some(mut lo), Some(mut hi)) = (self.rank(f64::MIN).1, self.largest_at_most(f64::MAX))
        else {
            return max;
        };

        for _ in 0..MAX_BISECT_STEPS {
            let probe = (lo * (1.0 - q) + hi * q).clamp(lo, hi);
            let (rank, next) = self.rank(probe);
            match rank.cmp(&target) {
                Ordering::Equal => return next.unwrap_or(hi),
                Ordering::Less => lo = probe,
                Ordering::Greater => hi = probe,
            }
        }
        self.select_between(lo, hi, target)
    }

    /// Resets the sketch to an empty state.
    pub fn reset(&mut self) {
        for level in &mut self.levels {
            level.values.clear();
            level.sorted = true;
        }
    }

    fn compact(&mut self, l: usize) {
        if l + 1 == self.levels.len() {
            debug!(
                level = l,
                discarded = self.levels[l].values.len(),
                "dropping terminal level"
            );
            self.levels[l].values.clear();
            self.levels[l].sorted = true;
            return;
        }
        if self.levels[l + 1].values.len() > self.width / 2 {
            self.compact(l + 1);
        }

        let (lower, upper) = self.levels.split_at_mut(l + 1);
        let current = &mut lower[l];
        let next = &mut upper[0];
        current.sort();

        let n = current.values.len();
        next.sorted = next.values.is_empty();
        for i in (0..n).step_by(2) {
            if i < n / 2 {
                next.values.push(current.values[i]);
            } else if i + 1 < n {
                next.values.push(current.values[i + 1]);
            }
        }
        current.values.clear();
        current.sorted = true;
    }

    /// Sorts every level and returns the global `(min, max, count)`.
    fn prepare_query(&mut self) -> Option<(f64, f64, usize)> {
        let mut bounds: Option<(f64, f64)> = None;
        let mut n = 0;
        for level in &mut self.levels {
            if level.values.is_empty() {
                continue;
            }
            level.sort();
            let first = level.values[0];
            let last = level.values[level.values.len() - 1];
            n += level.values.len();
            bounds = Some(match bounds {
                None => (first, last),
                Some((lo, hi)) => (lo.min(first), hi.max(last)),
            });
        }
        bounds.map(|(lo, hi)| (lo, hi, n))
    }

    /// Counts stored values below `probe` and finds the smallest stored value at or above it.
    fn rank(&self, probe: f64) -> (usize, Option<f64>) {
        let mut rank = 0;
        let mut next: Option<f64> = None;
        for level in &self.levels {
            let pos = level.values.partition_point(|&v| v < probe);
            rank += pos;
            if let Some(&candidate) = level.values.get(pos) {
                next = Some(next.map_or(candidate, |x| x.min(candidate)));
            }
        }
        (rank, next)
    }

    fn largest_at_most(&self, probe: f64) -> Option<f64> {
        self.levels
            .iter()
            .filter_map(|level| {
                let pos = level.values.partition_point(|&v| v <= probe);
                pos.checked_sub(1).map(|i| level.values[i])
            })
            .max_by(f64::total_cmp)
    }

    /// Picks the stored value of global rank `target` from those in `[lo, hi]`.
    ///
    /// Requires fewer than `target + 1` values below `lo` and more than `target` at or below `hi`.
    fn select_between(&self, lo: f64, hi: f64, target: usize) -> f64 {
        let (below, _) = self.rank(lo);
        let mut window: Vec<f64> = self
            .levels
            .iter()
            .flat_map(|level| {
                let start = level.values.partition_point(|&v| v < lo);
                let end = level.values.partition_point(|&v| v <= hi);
                &level.values[start..end]
            })
            .copied()
            .collect();
        window.sort_unstable_by(f64::total_cmp);
        window
            .get(target.saturating_sub(below))
            .or(window.last())
            .copied()
            .unwrap_or(hi)
    }
}

impl QuantileSketch for LeveledSketch {
    fn insert(&mut self, value: f64) {
        LeveledSketch::insert(self, value);
    }

    fn query(&mut self, q: f64) -> f64 {
        LeveledSketch::query(self, q)
    }
}

impl fmt::Display for LeveledSketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (l, level) in self.levels.iter().enumerate() {
            write!(f, "level {l:2x}:")?;
            for v in &level.values {
                write!(f, " {v:.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
