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

//! Logarithmic-bucket histogram with a relative-error guarantee, in the style of DDSketch.
//!
//! # Overview
//!
//! This sketch is based on the paper ["DDSketch: A Fast and Fully-Mergeable Quantile Sketch with
//! Relative-Error Guarantees"](https://arxiv.org/abs/1908.10693) by Charles Masson, Jee E. Rim
//! and Homin K. Lee.
//!
//! For a relative accuracy `a`, magnitudes are mapped to buckets of geometric width
//! `gamma = (1 + a) / (1 - a)`: bucket `k` covers `[gamma^k, gamma^(k+1))` and is represented by
//! `(1 + a) * gamma^k`, which is within relative error `a` of every value in the bucket.
//! Positive and negative values are kept in two separate sparse bin vectors; magnitudes too
//! small to be represented are counted as zeros.
//!
//! The bin vectors grow on demand at either end, so memory is bounded by the range of
//! magnitudes actually observed rather than by a fixed capacity.
//!
//! # Examples
//!
//! ```
//! # use quantiles::loghist::LogHistogram;
//! let mut sketch = LogHistogram::new(0.01);
//! for i in 1..=100 {
//!     sketch.insert(i as f64);
//! }
//! let p50 = sketch.query(0.5);
//! assert!((p50 - 50.0).abs() < 1.5);
//! ```

mod bins;
mod sketch;

pub use self::sketch::LogHistogram;
