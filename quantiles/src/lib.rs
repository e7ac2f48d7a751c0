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

//! # Streaming quantile sketches
//!
//! Bounded-memory summaries of a stream of `f64` values that answer "what value sits at
//! quantile `q`?" approximately, without keeping the raw samples.
//!
//! The crate provides four families, each with its own accuracy trade-off:
//!
//! * [`tdigest::TDigest`]: a fixed-capacity t-digest whose resolution is steered by an
//!   [`tdigest::Invariant`]. Shards can be merged or queried together through
//!   [`tdigest::MultiDigestQuery`].
//! * [`kll::LeveledSketch`]: a KLL-style stack of levels with deterministic halving.
//! * [`loghist::LogHistogram`]: a DDSketch-style logarithmic histogram with a relative error
//!   guarantee.
//! * [`biased::BiasedStream`]: a Greenwald-Khanna style biased sample buffer.
//!
//! All of them implement [`common::QuantileSketch`]. NaN inputs are silently ignored and
//! querying an empty sketch returns `0.0`. None of the sketches is internally synchronized:
//! give each worker its own instance and combine them when reading.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod biased;
pub mod common;
pub mod error;
pub mod kll;
pub mod loghist;
pub mod tdigest;
