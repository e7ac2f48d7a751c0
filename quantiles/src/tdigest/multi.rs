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

use std::borrow::Cow;

use tracing::trace;

use crate::tdigest::Centroid;
use crate::tdigest::TDigest;
use crate::tdigest::scan::scan_quantiles;

/// Read-only quantile view over several digests at once.
///
/// The shards are treated as one logical digest: their centroids are merged on the fly in
/// ascending value order, without building a combined digest. Shards that are already sorted
/// are borrowed; unsorted ones are copied and sorted once, when the view is created. Queries
/// take `&self` and keep their merge state on the stack, so one view can serve several threads.
#[derive(Debug, Clone)]
pub struct MultiDigestQuery<'a> {
    shards: Vec<Cow<'a, [Centroid]>>,
    total: f64,
}

impl<'a> MultiDigestQuery<'a> {
    /// Creates a view over `digests`. Empty digests are skipped.
    pub fn new<I>(digests: I) -> Self
    where
        I: IntoIterator<Item = &'a TDigest>,
    {
        let mut shards = Vec::new();
        let mut total = 0.0;
        for digest in digests {
            if digest.is_empty() {
                continue;
            }
            total += digest.total_weight();
            let centroids = digest.centroids();
            if digest.is_sorted() {
                shards.push(Cow::Borrowed(centroids));
            } else {
                let mut owned = centroids.to_vec();
                owned.sort_unstable_by(|a, b| a.value().total_cmp(&b.value()));
                shards.push(Cow::Owned(owned));
            }
        }
        trace!(shards = shards.len(), total, "created multi-digest view");
        Self { shards, total }
    }

    /// Returns the number of non-empty shards in the view.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Returns true if every shard was empty.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Returns the combined weight of all shards.
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Returns the estimated value at quantile `q` across all shards, or `0.0` if they are all
    /// empty.
    pub fn query(&self, q: f64) -> f64 {
        let mut out = [0.0];
        self.query_multi(&[q], &mut out);
        out[0]
    }

    /// Answers several quantiles in one merged pass; `out[i]` receives the estimate for `qs[i]`.
    ///
    /// # Panics
    ///
    /// Panics if `qs` and `out` have different lengths.
    pub fn query_multi(&self, qs: &[f64], out: &mut [f64]) {
        assert_eq!(qs.len(), out.len(), "qs and out must have the same length");
        let Some((min, max)) = self.bounds() else {
            out.fill(0.0);
            return;
        };
        scan_quantiles(self.merged(), self.total, min, max, qs, out);
    }

    fn bounds(&self) -> Option<(f64, f64)> {
        let min = self
            .shards
            .iter()
            .filter_map(|s| s.first())
            .map(Centroid::value)
            .min_by(f64::total_cmp)?;
        let max = self
            .shards
            .iter()
            .filter_map(|s| s.last())
            .map(Centroid::value)
            .max_by(f64::total_cmp)?;
        Some((min, max))
    }

    fn merged(&self) -> MergeIter<'_> {
        MergeIter {
            shards: &self.shards,
            cursors: vec![0; self.shards.len()],
        }
    }
}

/// K-way merge of sorted shards, yielding centroids in ascending value order.
struct MergeIter<'s> {
    shards: &'s [Cow<'s, [Centroid]>],
    cursors: Vec<usize>,
}

impl Iterator for MergeIter<'_> {
    type Item = Centroid;

    fn next(&mut self) -> Option<Centroid> {
        let mut best: Option<(usize, Centroid)> = None;
        for (i, shard) in self.shards.iter().enumerate() {
            let Some(&candidate) = shard.get(self.cursors[i]) else {
                continue;
            };
            if best.is_none_or(|(_, b)| candidate.value() < b.value()) {
                best = Some((i, candidate));
            }
        }
        let (i, centroid) = best?;
        self.cursors[i] += 1;
        Some(centroid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(values: &[f64]) -> TDigest {
        let mut digest = TDigest::extremes_biased(0.01, 64);
        for &v in values {
            digest.insert(v);
        }
        digest
    }

    #[test]
    fn test_merge_iter_orders_across_shards() {
        let shards = [digest(&[1.0, 4.0, 5.0]), digest(&[3.0, 2.0]), digest(&[])];
        let query = MultiDigestQuery::new(&shards);
        assert_eq!(query.len(), 2);
        assert_eq!(query.total_weight(), 5.0);
        let values: Vec<f64> = query.merged().map(|c| c.value()).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_borrows_sorted_shards() {
        let shards = [digest(&[1.0, 2.0]), digest(&[2.0, 1.0])];
        let query = MultiDigestQuery::new(&shards);
        assert!(matches!(query.shards[0], Cow::Borrowed(_)));
        assert!(matches!(query.shards[1], Cow::Owned(_)));
    }

    #[test]
    fn test_empty_view() {
        let shards = [digest(&[]), digest(&[])];
        let query = MultiDigestQuery::new(&shards);
        assert!(query.is_empty());
        assert_eq!(query.query(0.5), 0.0);
    }

    #[test]
    fn test_extremes() {
        let shards = [digest(&[5.0, 7.0]), digest(&[-2.0, 11.0])];
        let query = MultiDigestQuery::new(&shards);
        let mut out = [0.0; 2];
        query.query_multi(&[1.0, 0.0], &mut out);
        assert_eq!(out, [11.0, -2.0]);
    }
}
