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

use std::thread;

use common::Exact;
use googletest::assert_that;
use googletest::prelude::near;
use quantiles::tdigest::MultiDigestQuery;
use quantiles::tdigest::TDigest;

const QUANTILES: [f64; 5] = [0.01, 0.1, 0.5, 0.9, 0.99];

#[test]
fn test_shards_split_by_value_range() {
    let values = common::uniform(101, 1_000);
    let mut exact = Exact::from_values(&values);

    let mut shards: Vec<TDigest> = (0..4).map(|_| TDigest::extremes_biased(0.01, 128)).collect();
    let mut single = TDigest::extremes_biased(0.01, 512);
    for &v in &values {
        let shard = ((v * 4.0) as usize).min(3);
        shards[shard].insert(v);
        single.insert(v);
    }

    let query = MultiDigestQuery::new(&shards);
    assert_eq!(query.len(), 4);
    assert_that!(query.total_weight(), near(1_000.0, 1e-9));

    let mut combined = [0.0; 5];
    query.query_multi(&QUANTILES, &mut combined);
    let mut reference = [0.0; 5];
    single.query_multi(&QUANTILES, &mut reference);
    for ((q, actual), expected) in QUANTILES.iter().zip(combined).zip(reference) {
        let exact = exact.query(*q);
        assert_that!(actual, near(exact, 0.01));
        assert_that!(expected, near(exact, 0.01));
    }
}

#[test]
fn test_round_robin_normal_shards() {
    let values = common::normal(77, 30_000, 100.0, 15.0);
    let mut exact = Exact::from_values(&values);
    let mut shards: Vec<TDigest> = (0..3).map(|_| TDigest::extremes_biased(0.01, 128)).collect();
    for (i, &v) in values.iter().enumerate() {
        shards[i % 3].insert(v);
    }

    let query = MultiDigestQuery::new(&shards);
    for (q, tolerance) in QUANTILES.iter().zip([2.5, 1.0, 1.0, 1.0, 2.5]) {
        assert_that!(query.query(*q), near(exact.query(*q), tolerance));
    }
}

#[test]
fn test_matches_single_digest_for_one_shard() {
    let mut digest = TDigest::low_biased(0.02, 64);
    for v in common::uniform(5, 5_000) {
        digest.insert(v);
    }
    let qs = [0.0, 0.05, 0.3, 0.5, 0.7, 0.95, 1.0];
    let mut expected = [0.0; 7];
    digest.query_multi(&qs, &mut expected);

    let query = MultiDigestQuery::new([&digest]);
    let mut actual = [0.0; 7];
    query.query_multi(&qs, &mut actual);
    assert_eq!(actual, expected);
}

#[test]
fn test_unsorted_shards_are_not_mutated() {
    let mut a = TDigest::extremes_biased(0.01, 64);
    let mut b = TDigest::extremes_biased(0.01, 64);
    for v in [5.0, 1.0, 3.0] {
        a.insert(v);
    }
    for v in [4.0, 2.0] {
        b.insert(v);
    }
    assert!(!a.is_sorted());

    let query = MultiDigestQuery::new([&a, &b]);
    assert_eq!(query.query(0.0), 1.0);
    assert_eq!(query.query(1.0), 5.0);
    assert_eq!(query.query(0.5), 3.0);
    assert!(!a.is_sorted());
    assert_eq!(a.centroids()[0].value(), 5.0);
}

#[test]
fn test_empty_shards() {
    let shards = [TDigest::extremes_biased(0.01, 16), TDigest::extremes_biased(0.01, 16)];
    let query = MultiDigestQuery::new(&shards);
    assert!(query.is_empty());
    let mut out = [1.0; 2];
    query.query_multi(&[0.0, 0.5], &mut out);
    assert_eq!(out, [0.0, 0.0]);
}

#[test]
fn test_concurrent_queries_share_one_view() {
    let mut shards: Vec<TDigest> = (0..4).map(|_| TDigest::extremes_biased(0.02, 64)).collect();
    for (i, v) in common::uniform(13, 8_000).into_iter().enumerate() {
        shards[i % 4].insert(v);
    }
    let query = MultiDigestQuery::new(&shards);
    let expected: Vec<f64> = QUANTILES.iter().map(|&q| query.query(q)).collect();

    thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let mut out = [0.0; 5];
                    query.query_multi(&QUANTILES, &mut out);
                    out
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().to_vec(), expected);
        }
    });
}
