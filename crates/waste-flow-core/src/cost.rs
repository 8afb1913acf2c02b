// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::primitives::{Cost, Kilometers, Quantity};
use serde::Serialize;

/// Default transport rate in currency units per kilometer.
pub const DEFAULT_COST_PER_KM: Cost = 2.0;

/// Linear distance-proportional transport cost.
///
/// The rate is an explicit value carried by the configuration of a run,
/// not process-wide state, so concurrent runs with different rates are
/// safe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransportCostModel {
    cost_per_km: Cost,
}

impl TransportCostModel {
    #[inline]
    pub fn new(cost_per_km: Cost) -> Self {
        Self { cost_per_km }
    }

    #[inline]
    pub fn cost_per_km(&self) -> Cost {
        self.cost_per_km
    }

    /// Cost of moving one unit of waste over the given distance.
    #[inline]
    pub fn unit_cost(&self, distance: Kilometers) -> Cost {
        distance.get() * self.cost_per_km
    }

    /// Cost of moving the whole quantity over the given distance.
    #[inline]
    pub fn total_cost(&self, distance: Kilometers, quantity: Quantity) -> Cost {
        quantity.cost_at(self.unit_cost(distance))
    }
}

impl Default for TransportCostModel {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_COST_PER_KM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate() {
        let m = TransportCostModel::default();
        assert_eq!(m.cost_per_km(), DEFAULT_COST_PER_KM);
    }

    #[test]
    fn test_unit_cost_is_linear_in_distance() {
        let m = TransportCostModel::new(2.0);
        assert_eq!(m.unit_cost(Kilometers::new(0.0)), 0.0);
        assert_eq!(m.unit_cost(Kilometers::new(1.0)), 2.0);
        assert_eq!(m.unit_cost(Kilometers::new(10.0)), 20.0);
    }

    #[test]
    fn test_total_cost_scales_with_quantity() {
        let m = TransportCostModel::new(1.5);
        let d = Kilometers::new(4.0);
        assert_eq!(m.total_cost(d, Quantity::new(0)), 0.0);
        assert_eq!(m.total_cost(d, Quantity::new(10)), 60.0);
    }
}
