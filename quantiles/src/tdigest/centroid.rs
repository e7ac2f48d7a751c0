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

use crate::common::weighted_mean;

/// A value with the weight of the samples it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    value: f64,
    weight: f32,
}

impl Centroid {
    /// Creates a centroid.
    pub fn new(value: f64, weight: f32) -> Self {
        Self { value, weight }
    }

    /// Returns the mean value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the weight.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Absorbs `other`, taking the weighted mean value and the summed weight.
    pub(super) fn merge(&mut self, other: &Centroid) {
        self.value = weighted_mean(
            self.value,
            f64::from(self.weight),
            other.value,
            f64::from(other.weight),
        );
        self.weight += other.weight;
    }

    /// Infinite values only merge with an equal value.
    pub(super) fn can_merge(&self, other: &Centroid) -> bool {
        (!self.value.is_infinite() && !other.value.is_infinite()) || self.value == other.value
    }

    pub(super) fn scale(&mut self, factor: f32) {
        self.weight *= factor;
    }
}
