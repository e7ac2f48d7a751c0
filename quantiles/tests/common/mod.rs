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

#![allow(dead_code)]

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Normal;

/// Exact order statistics over every value kept in memory.
#[derive(Debug, Default, Clone)]
pub struct Exact {
    values: Vec<f64>,
    sorted: bool,
}

impl Exact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: &[f64]) -> Self {
        let mut exact = Self::new();
        values.iter().for_each(|&v| exact.insert(v));
        exact
    }

    pub fn insert(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.values.push(value);
        self.sorted = false;
    }

    /// Value at index `floor(q * n)`, clamped to the last element.
    pub fn query(&mut self, q: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        if !self.sorted {
            self.values.sort_unstable_by(f64::total_cmp);
            self.sorted = true;
        }
        let n = self.values.len();
        let index = ((q.clamp(0.0, 1.0) * n as f64) as usize).min(n - 1);
        self.values[index]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

pub fn uniform(seed: u64, n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random::<f64>()).collect()
}

pub fn normal(seed: u64, n: usize, mean: f64, std_dev: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Normal::new(mean, std_dev).unwrap();
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}
