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

//! t-digest with a pluggable error-budget policy.
//!
//! # Overview
//!
//! The digest follows ["Computing Extremely Accurate Quantiles Using t-Digests"](https://arxiv.org/abs/1902.04023)
//! by Ted Dunning and Otmar Ertl, in the buffer-and-merge form used by ClickHouse's
//! `QuantileTDigest`. Values are appended to a fixed-capacity array of [`Centroid`]s. When the
//! array is full it is sorted and compressed in a single greedy pass: two neighbouring centroids
//! are merged when their combined weight stays within the budget an [`Invariant`] grants at
//! their quantile positions. The invariant decides where resolution is spent:
//!
//! * [`Invariant::HighBias`] keeps the upper tail fine-grained.
//! * [`Invariant::LowBias`] keeps the lower tail fine-grained.
//! * [`Invariant::ExtremesBias`] keeps both tails fine-grained and the median coarse.
//! * [`Invariant::Custom`] takes any function of the quantile position.
//!
//! If the greedy pass cannot free any room, for example on heavily duplicated input, neighbouring
//! pairs are merged unconditionally, which halves the array and keeps memory bounded for every
//! input distribution. A decay factor below one ages out past mass after each such cycle.
//!
//! Digests maintained by independent workers can be combined with [`TDigest::merge`], or queried
//! together without copying through [`MultiDigestQuery`].
//!
//! # Examples
//!
//! ```
//! # use quantiles::tdigest::TDigest;
//! let mut digest = TDigest::extremes_biased(0.01, 512);
//! for i in 0..10_000 {
//!     digest.insert(i as f64);
//! }
//! let mut out = [0.0; 3];
//! digest.query_multi(&[0.99, 0.5, 0.01], &mut out);
//! assert!((out[0] - 9900.0).abs() < 50.0);
//! assert!((out[1] - 5000.0).abs() < 100.0);
//! assert!((out[2] - 100.0).abs() < 50.0);
//! ```
//!
//! # Querying shards
//!
//! ```
//! # use quantiles::tdigest::MultiDigestQuery;
//! # use quantiles::tdigest::TDigest;
//! let mut shards = vec![TDigest::extremes_biased(0.05, 128), TDigest::extremes_biased(0.05, 128)];
//! for i in 0..1000 {
//!     shards[i % 2].insert(i as f64);
//! }
//! let query = MultiDigestQuery::new(&shards);
//! assert!((query.query(0.5) - 500.0).abs() < 30.0);
//! ```

mod centroid;
mod invariant;
mod multi;
mod scan;
mod sketch;

pub use self::centroid::Centroid;
pub use self::invariant::Invariant;
pub use self::multi::MultiDigestQuery;
pub use self::sketch::CompressionStats;
pub use self::sketch::TDigest;
pub use self::sketch::TDigestBuilder;
