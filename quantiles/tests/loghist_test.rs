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

mod common;

use common::Exact;
use googletest::assert_that;
use googletest::prelude::near;
use quantiles::error::ErrorKind;
use quantiles::loghist::LogHistogram;

const QUANTILES: [f64; 9] = [0.0, 0.001, 0.01, 0.1, 0.5, 0.9, 0.99, 0.999, 1.0];

fn assert_relative(sketch: &LogHistogram, exact: &mut Exact) {
    let accuracy = sketch.relative_accuracy();
    for q in QUANTILES {
        let expected = exact.query(q);
        let actual = sketch.query(q);
        let tolerance = accuracy * expected.abs() * (1.0 + 1e-9);
        assert!(
            (actual - expected).abs() <= tolerance,
            "q={q}: expected {expected}, got {actual}"
        );
    }
}

#[test]
fn test_single_value_then_small_integers() {
    let mut sketch = LogHistogram::new(0.01);
    let mut exact = Exact::new();
    sketch.insert(5.0);
    exact.insert(5.0);
    for q in [0.0, 0.5, 1.0] {
        assert_that!(sketch.query(q), near(5.0, 0.06));
    }

    for i in 0..=16 {
        sketch.insert(i as f64);
        exact.insert(i as f64);
    }
    for q in [0.0, 0.5, 1.0] {
        assert_that!(sketch.query(q), near(exact.query(q), 0.4));
    }
}

#[test]
fn test_empty_and_zero_only() {
    let mut sketch = LogHistogram::new(0.02);
    assert!(sketch.is_empty());
    assert_eq!(sketch.query(0.5), 0.0);

    sketch.insert(0.0);
    sketch.insert(0.0);
    assert!(!sketch.is_empty());
    for q in QUANTILES {
        assert_eq!(sketch.query(q), 0.0);
    }
}

#[test]
fn test_relative_accuracy_on_lognormal_like_stream() {
    let mut sketch = LogHistogram::new(0.01);
    let mut exact = Exact::new();
    for v in common::normal(7, 20_000, 0.0, 3.0) {
        let v = v.exp();
        sketch.insert(v);
        exact.insert(v);
    }
    assert_relative(&sketch, &mut exact);
}

#[test]
fn test_relative_accuracy_with_mixed_signs() {
    let mut sketch = LogHistogram::new(0.005);
    let mut exact = Exact::new();
    for v in common::normal(11, 10_000, 0.0, 50.0) {
        sketch.insert(v);
        exact.insert(v);
    }
    for _ in 0..500 {
        sketch.insert(0.0);
        exact.insert(0.0);
    }
    assert_relative(&sketch, &mut exact);
    assert_eq!(sketch.total_weight(), 10_500.0);
}

#[test]
fn test_negative_only() {
    let mut sketch = LogHistogram::new(0.01);
    for i in 1..=100 {
        sketch.insert(-(i as f64));
    }
    assert_that!(sketch.query(0.0), near(-100.0, 1.1));
    assert_that!(sketch.query(1.0), near(-1.0, 0.02));
    assert_that!(sketch.query(0.5), near(-50.0, 0.6));
}

#[test]
fn test_weighted_insert() {
    let mut sketch = LogHistogram::new(0.01);
    sketch.insert_weighted(10.0, 3.0);
    sketch.insert_weighted(1000.0, 1.0);
    sketch.insert_weighted(5.0, 0.0);
    sketch.insert_weighted(5.0, f32::NAN);
    sketch.insert_weighted(f64::NAN, 1.0);
    assert_eq!(sketch.total_weight(), 4.0);
    assert_that!(sketch.query(0.5), near(10.0, 0.11));
    assert_that!(sketch.query(0.8), near(1000.0, 10.5));
}

#[test]
fn test_nan_is_ignored() {
    let mut sketch = LogHistogram::new(0.01);
    sketch.insert(3.0);
    sketch.insert(f64::NAN);
    assert_eq!(sketch.total_weight(), 1.0);
}

#[test]
fn test_merge_matches_single_sketch() {
    let values = common::normal(3, 4_000, 10.0, 20.0);
    let (left, right) = values.split_at(values.len() / 2);

    let mut all = LogHistogram::new(0.01);
    values.iter().for_each(|&v| all.insert(v));
    let mut merged = LogHistogram::new(0.01);
    left.iter().for_each(|&v| merged.insert(v));
    let mut other = LogHistogram::new(0.01);
    right.iter().for_each(|&v| other.insert(v));

    merged.merge(&other).unwrap();
    assert_eq!(merged.total_weight(), all.total_weight());
    for q in QUANTILES {
        assert_eq!(merged.query(q), all.query(q), "q={q}");
    }
}

#[test]
fn test_merge_incompatible_accuracy() {
    let mut a = LogHistogram::new(0.01);
    let b = LogHistogram::new(0.02);
    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleSketches);
}

#[test]
fn test_invalid_accuracy() {
    for accuracy in [0.0, 1.0, -0.1, f64::NAN] {
        let err = LogHistogram::try_new(accuracy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

#[test]
#[should_panic(expected = "relative accuracy must be in (0, 1)")]
fn test_new_panics_on_invalid_accuracy() {
    LogHistogram::new(1.5);
}

#[test]
fn test_reset() {
    let mut sketch = LogHistogram::new(0.01);
    sketch.insert(-4.0);
    sketch.insert(0.0);
    sketch.insert(4.0);
    sketch.reset();
    assert!(sketch.is_empty());
    assert_eq!(sketch.query(1.0), 0.0);
}

#[test]
fn test_debug_dump() {
    let mut sketch = LogHistogram::new(0.5);
    sketch.insert(1.0);
    sketch.insert(0.0);
    sketch.insert(-1.0);
    insta::assert_snapshot!(sketch.to_string(), @r"
    totals (neg+zero+pos): 1.00 + 1.00 + 1.00
    negative (offset 0)
      key    0  value 1.500  weight 1.0
    positive (offset 0)
      key    0  value 1.500  weight 1.0
    ");
}
