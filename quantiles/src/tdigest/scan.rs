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

//! Batched quantile lookup over an ascending stream of centroids.

use crate::common::weighted_mean;
use crate::tdigest::Centroid;

/// Answers `qs` in one forward pass over `centroids`, which must be in ascending value order
/// and carry `total` weight between them. `min` and `max` are the first and last values.
///
/// Each centroid stands at the midpoint of its cumulative weight. A target rank between two
/// midpoints is answered by interpolating between the two centroid values.
pub(super) fn scan_quantiles<I>(
    centroids: I,
    total: f64,
    min: f64,
    max: f64,
    qs: &[f64],
    out: &mut [f64],
) where
    I: IntoIterator<Item = Centroid>,
{
    assert_eq!(qs.len(), out.len(), "qs and out must have the same length");

    let mut order = Vec::with_capacity(qs.len());
    for (i, &q) in qs.iter().enumerate() {
        if q <= 0.0 {
            out[i] = min;
        } else if q >= 1.0 {
            out[i] = max;
        } else {
            order.push(i);
        }
    }
    order.sort_unstable_by(|&a, &b| qs[a].total_cmp(&qs[b]));

    let mut pending = order.into_iter().peekable();
    let mut sum = 0.0;
    let mut prev_mid = 0.0;
    let mut prev_value = min;
    for centroid in centroids {
        if pending.peek().is_none() {
            return;
        }
        let weight = f64::from(centroid.weight());
        let mid = sum + 0.5 * weight;
        while let Some(&i) = pending.peek() {
            let target = qs[i] * total;
            if mid < target {
                break;
            }
            out[i] = if target <= prev_mid {
                prev_value
            } else if target >= mid {
                centroid.value()
            } else {
                let k = (target - prev_mid) / (mid - prev_mid);
                weighted_mean(prev_value, 1.0 - k, centroid.value(), k)
            };
            pending.next();
        }
        sum += weight;
        prev_mid = mid;
        prev_value = centroid.value();
    }
    for i in pending {
        out[i] = max;
    }
}
