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

//! Nearest-capacity greedy heuristic.
//!
//! The recovery path when the exact solver fails: producers in
//! ascending id order each route their remaining supply to the nearest
//! processor with residual capacity, ties broken by ascending processor
//! id. Not cost-optimal, but deterministic, total, and it produces the
//! same output shape as the exact solver.

use std::collections::BTreeMap;
use tracing::debug;
use waste_flow_core::prelude::{haversine_km, Quantity, TransportCostModel};
use waste_flow_model::common::{Period, WasteType};
use waste_flow_model::prelude::{Allocation, AllocationSet, Problem, RunStatus};

#[derive(Debug, Clone, Copy)]
pub struct GreedyAllocator {
    cost_model: TransportCostModel,
}

impl GreedyAllocator {
    #[inline]
    pub fn new(cost_model: TransportCostModel) -> Self {
        Self { cost_model }
    }

    /// Allocates one (waste type, period) run. Infallible: when all
    /// capacity saturates, leftover supply lands in `unmet_demand` and
    /// the status turns `GreedyPartial`.
    pub fn allocate(
        &self,
        problem: &Problem,
        waste_type: WasteType,
        period: Period,
    ) -> AllocationSet {
        // (id, location, residual capacity), kept in ascending id order
        // so distance ties fall to the lower id.
        let mut open: Vec<_> = problem
            .processors()
            .iter()
            .map(|q| (q.id(), q.location(), q.capacity()))
            .collect();

        let mut allocations = Vec::new();
        let mut unmet: BTreeMap<_, Quantity> = BTreeMap::new();

        for producer in problem.producers().iter() {
            let mut left = producer.supply_of(waste_type);
            while !left.is_zero() {
                let nearest = open
                    .iter_mut()
                    .filter(|(_, _, cap)| !cap.is_zero())
                    .map(|slot| {
                        let distance = haversine_km(producer.location(), slot.1);
                        (distance, slot)
                    })
                    .min_by(|(da, a), (db, b)| da.total_cmp(db).then(a.0.cmp(&b.0)));

                let Some((distance, slot)) = nearest else {
                    break;
                };

                let amount = left.min(slot.2);
                let unit_cost = self.cost_model.unit_cost(distance);
                allocations.push(Allocation::new(
                    producer.id(),
                    slot.0,
                    waste_type,
                    period,
                    amount,
                    distance,
                    unit_cost,
                ));
                slot.2 = slot.2.saturating_sub(amount);
                left = left.saturating_sub(amount);
            }

            if !left.is_zero() {
                debug!(producer = %producer.id(), unmet = %left, "capacity exhausted");
                unmet.insert(producer.id(), left);
            }
        }

        let status = if unmet.is_empty() {
            RunStatus::GreedyFallback
        } else {
            RunStatus::GreedyPartial
        };
        AllocationSet::new(waste_type, period, status, allocations, unmet)
    }
}

impl Default for GreedyAllocator {
    #[inline]
    fn default() -> Self {
        Self::new(TransportCostModel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waste_flow_core::prelude::GeoPoint;
    use waste_flow_model::common::{ProcessorIdentifier, ProducerIdentifier};
    use waste_flow_model::prelude::{Processor, Producer};

    #[inline]
    fn pid(n: u32) -> ProducerIdentifier {
        ProducerIdentifier::new(n)
    }

    #[inline]
    fn prid(n: u32) -> ProcessorIdentifier {
        ProcessorIdentifier::new(n)
    }

    #[inline]
    fn gp(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn producer(id: u32, lat: f64, organic: u64) -> Producer {
        let mut m = BTreeMap::new();
        m.insert(WasteType::Organic, Quantity::new(organic));
        Producer::new(pid(id), gp(lat, 2.2), m)
    }

    fn processor(id: u32, lat: f64, cap: u64) -> Processor {
        Processor::new(prid(id), gp(lat, 2.2), Quantity::new(cap))
    }

    fn allocate(problem: &Problem) -> AllocationSet {
        GreedyAllocator::default().allocate(problem, WasteType::Organic, Period::new(0))
    }

    #[test]
    fn test_routes_to_the_nearest_processor() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 100)],
            [processor(1, 41.40, 200), processor(2, 42.40, 200)],
        )
        .unwrap();
        let set = allocate(&problem);

        assert_eq!(set.status(), RunStatus::GreedyFallback);
        assert_eq!(set.allocations().len(), 1);
        assert_eq!(set.allocations()[0].processor(), prid(1));
        assert_eq!(set.routed_total(), Quantity::new(100));
        assert!(set.is_fully_satisfied());
    }

    #[test]
    fn test_overflows_to_next_nearest_when_full() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 100)],
            [processor(1, 41.40, 60), processor(2, 42.40, 200)],
        )
        .unwrap();
        let set = allocate(&problem);

        assert_eq!(set.allocations().len(), 2);
        assert_eq!(set.received_by(prid(1)), Quantity::new(60));
        assert_eq!(set.received_by(prid(2)), Quantity::new(40));
        assert!(set.is_fully_satisfied());
    }

    #[test]
    fn test_producers_run_in_ascending_id_order() {
        // Both producers want the same 100-capacity processor; the
        // lower id drains it first.
        let problem = Problem::from_entities(
            [producer(2, 41.40, 80), producer(1, 41.40, 80)],
            [processor(1, 41.40, 100), processor(2, 42.40, 100)],
        )
        .unwrap();
        let set = allocate(&problem);

        assert_eq!(set.routed_by(pid(1)), Quantity::new(80));
        let first: Vec<_> = set
            .allocations()
            .iter()
            .filter(|a| a.producer() == pid(1))
            .collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].processor(), prid(1));

        // Producer 2 gets the 20 left over near, 60 far.
        assert_eq!(set.received_by(prid(1)), Quantity::new(100));
        assert_eq!(set.received_by(prid(2)), Quantity::new(60));
    }

    #[test]
    fn test_distance_tie_breaks_by_processor_id() {
        // Two processors at the identical location.
        let problem = Problem::from_entities(
            [producer(1, 41.40, 50)],
            [processor(2, 41.50, 100), processor(1, 41.50, 100)],
        )
        .unwrap();
        let set = allocate(&problem);
        assert_eq!(set.allocations()[0].processor(), prid(1));
    }

    #[test]
    fn test_partial_when_capacity_exhausted() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 100), producer(2, 41.38, 100)],
            [processor(1, 41.42, 150)],
        )
        .unwrap();
        let set = allocate(&problem);

        assert_eq!(set.status(), RunStatus::GreedyPartial);
        assert_eq!(set.routed_total(), Quantity::new(150));
        assert_eq!(set.unmet_total(), Quantity::new(50));
        assert_eq!(
            set.unmet_demand().get(&pid(2)).copied(),
            Some(Quantity::new(50))
        );
    }

    #[test]
    fn test_zero_supply_producer_emits_nothing() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 0)],
            [processor(1, 41.42, 100)],
        )
        .unwrap();
        let set = allocate(&problem);
        assert!(set.allocations().is_empty());
        assert!(set.is_fully_satisfied());
        assert_eq!(set.status(), RunStatus::GreedyFallback);
    }
}
