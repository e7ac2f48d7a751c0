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

use crate::error::Error;

/// Error-budget policy of a [`super::TDigest`].
///
/// Maps a quantile position `q` in `[0, 1]` to the largest fraction of the total weight a
/// single centroid may hold there. The biased variants are parameterized by an accuracy `eps`,
/// the budget granted where the policy is most permissive.
#[derive(Debug, Clone, Copy)]
pub enum Invariant {
    /// `(1 - q^2) * eps`: fine resolution near `q = 1`.
    HighBias(f64),
    /// `(1 - (1 - q)^2) * eps`: fine resolution near `q = 0`.
    LowBias(f64),
    /// `4 * q * (1 - q) * eps`: fine resolution at both tails.
    ExtremesBias(f64),
    /// A caller-supplied budget function.
    Custom(fn(f64) -> f64),
}

impl Invariant {
    /// Returns the admissible weight fraction at quantile position `q`.
    pub fn bound(&self, q: f64) -> f64 {
        match *self {
            Invariant::HighBias(eps) => (1.0 - q * q) * eps,
            Invariant::LowBias(eps) => {
                let q = 1.0 - q;
                (1.0 - q * q) * eps
            }
            Invariant::ExtremesBias(eps) => 4.0 * q * (1.0 - q) * eps,
            Invariant::Custom(f) => f(q),
        }
    }

    pub(super) fn validate(&self) -> Result<(), Error> {
        let eps = match *self {
            Invariant::HighBias(eps) | Invariant::LowBias(eps) | Invariant::ExtremesBias(eps) => {
                eps
            }
            Invariant::Custom(_) => return Ok(()),
        };
        if eps > 0.0 && eps.is_finite() {
            Ok(())
        } else {
            Err(Error::invalid_argument("invariant accuracy must be positive and finite")
                .with_context("eps", eps))
        }
    }
}
