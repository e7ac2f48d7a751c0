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

//! Biased quantile stream with a fixed-size sample buffer.
//!
//! # Overview
//!
//! The stream is in the family of the Greenwald-Khanna summaries and is close in spirit to
//! "A Fast Algorithm for Approximate Quantiles in High Speed Data Streams" by Qi Zhang and
//! Wei Wang. It keeps at most `2 * b` weighted samples, where `b = ceil(ln(1 + 200000 * e) / e)`
//! for the configured epsilon `e`. When the buffer fills up the samples are sorted and greedily
//! folded into at most `b` buckets of roughly equal weight, each bucket holding the weighted mean
//! of the samples it absorbed.
//!
//! Independently maintained streams can be combined: [`BiasedStream::samples`] exposes the
//! compressed sample list of one stream and [`BiasedStream::merge`] folds such a list into
//! another.
//!
//! # Examples
//!
//! ```
//! # use quantiles::biased::BiasedStream;
//! let mut stream = BiasedStream::new(0.01);
//! for i in 0..1000 {
//!     stream.insert(i as f64);
//! }
//! let median = stream.query(0.5);
//! assert!((median - 500.0).abs() < 10.0);
//! ```

mod stream;

pub use self::stream::BiasedStream;
pub use self::stream::Sample;
