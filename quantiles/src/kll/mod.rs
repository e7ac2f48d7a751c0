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

//! Leveled compaction sketch in the style of KLL.
//!
//! # Overview
//!
//! The sketch is a cascade of `depth` levels, each holding at most `width` values. New values
//! enter level 0. A full level is sorted and roughly half of its values are promoted to the next
//! level, which conceptually represents twice the multiplicity. Promotion takes even positions
//! from the first half of the level and odd positions from the second half: a deterministic
//! stand-in for the random halving of the KLL paper ("Optimal Quantile Approximation in Streams"
//! by Zohar Karnin, Kevin Lang and Edo Liberty).
//!
//! The terminal level has no successor. When it must be compacted its contents are dropped, so
//! a fixed depth bounds memory to `width * depth` values at the cost of losing the oldest mass.
//!
//! Queries bisect the finite value range, counting how many stored values fall below a probe
//! with a binary search per level. The answer is always the stored value at the target rank,
//! so stored infinities are returned as-is and results never decrease as `q` grows.
//!
//! # Examples
//!
//! ```
//! # use quantiles::kll::LeveledSketch;
//! let mut sketch = LeveledSketch::new(32, 10);
//! for i in 0..32 {
//!     sketch.insert(i as f64);
//! }
//! assert_eq!(sketch.query(0.0), 0.0);
//! assert_eq!(sketch.query(1.0), 31.0);
//! ```

mod sketch;

pub use self::sketch::LeveledSketch;
