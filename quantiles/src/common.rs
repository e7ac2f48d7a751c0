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

//! Contract shared by every quantile sketch in this crate.

/// Insert/query contract implemented by every sketch family.
///
/// Queries take `&mut self` because sketches sort or compact lazily before answering.
pub trait QuantileSketch {
    /// Adds one sample. NaN values are ignored.
    fn insert(&mut self, value: f64);

    /// Returns the estimated value at quantile `q` (`0 <= q <= 1`).
    ///
    /// Returns `0.0` when the sketch is empty.
    fn query(&mut self, q: f64) -> f64;

    /// Answers several quantiles at once; `out[i]` receives the estimate for `qs[i]`.
    ///
    /// # Panics
    ///
    /// Panics if `qs` and `out` have different lengths.
    fn query_multi(&mut self, qs: &[f64], out: &mut [f64]) {
        assert_eq!(qs.len(), out.len(), "qs and out must have the same length");
        for (q, res) in qs.iter().zip(out.iter_mut()) {
            *res = self.query(*q);
        }
    }
}

/// Weighted mean of two values, kept inside `[min(a, b), max(a, b)]`.
///
/// Equal values (including same-signed infinities) are returned unchanged. The pair
/// `-inf`/`+inf` has no mean; the heavier side wins.
pub(crate) fn weighted_mean(a: f64, wa: f64, b: f64, wb: f64) -> f64 {
    if a == b {
        return a;
    }
    let mean = (a * wa + b * wb) / (wa + wb);
    if mean.is_nan() {
        return if wa >= wb { a } else { b };
    }
    mean.clamp(a.min(b), a.max(b))
}
