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

//! Result aggregation and reporting.
//!
//! Capacity is an aggregate per-period budget, so over-receipt across
//! waste types only becomes visible here, where the runs meet. By
//! default that is an error; soft-overflow mode downgrades it to a
//! warning and reports the >100% utilization instead.

use crate::err::AggregateError;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;
use waste_flow_core::prelude::{Cost, Kilometers, Quantity};
use waste_flow_model::common::{Period, ProcessorIdentifier, WasteType};
use waste_flow_model::prelude::{Allocation, AllocationSet, AllocationValidator, Problem, RunStatus};
use waste_flow_model::validation::err::SolutionValidationError;

/// Min/mean/max of the distances actually driven, unweighted over
/// allocation records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceStats {
    min: Kilometers,
    mean: Kilometers,
    max: Kilometers,
}

impl DistanceStats {
    fn from_allocations<'a, I>(allocations: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Allocation>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for a in allocations {
            let d = a.distance().get();
            count += 1;
            sum += d;
            min = min.min(d);
            max = max.max(d);
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            min: Kilometers::new(min),
            mean: Kilometers::new(sum / count as f64),
            max: Kilometers::new(max),
        })
    }

    #[inline]
    pub fn min(&self) -> Kilometers {
        self.min
    }

    #[inline]
    pub fn mean(&self) -> Kilometers {
        self.mean
    }

    #[inline]
    pub fn max(&self) -> Kilometers {
        self.max
    }
}

/// Load on one processor within one period, across all waste types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessorUtilization {
    period: Period,
    processor: ProcessorIdentifier,
    received: Quantity,
    capacity: Quantity,
    ratio: f64,
}

impl ProcessorUtilization {
    fn new(
        period: Period,
        processor: ProcessorIdentifier,
        received: Quantity,
        capacity: Quantity,
    ) -> Self {
        let ratio = if capacity.is_zero() {
            if received.is_zero() {
                0.0
            } else {
                f64::INFINITY
            }
        } else {
            received.get() as f64 / capacity.get() as f64
        };
        Self {
            period,
            processor,
            received,
            capacity,
            ratio,
        }
    }

    #[inline]
    pub fn period(&self) -> Period {
        self.period
    }

    #[inline]
    pub fn processor(&self) -> ProcessorIdentifier {
        self.processor
    }

    #[inline]
    pub fn received(&self) -> Quantity {
        self.received
    }

    #[inline]
    pub fn capacity(&self) -> Quantity {
        self.capacity
    }

    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    #[inline]
    pub fn is_overloaded(&self) -> bool {
        self.received > self.capacity
    }
}

/// Statistics of a single run, shipped alongside its allocation set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationSummary {
    status: RunStatus,
    routed_total: Quantity,
    unmet_total: Quantity,
    total_cost: Cost,
    distance: Option<DistanceStats>,
    utilization: Vec<ProcessorUtilization>,
}

impl OptimizationSummary {
    pub fn of(problem: &Problem, set: &AllocationSet) -> Self {
        let utilization = problem
            .processors()
            .iter()
            .map(|q| {
                ProcessorUtilization::new(
                    set.period(),
                    q.id(),
                    set.received_by(q.id()),
                    q.capacity(),
                )
            })
            .collect();
        Self {
            status: set.status(),
            routed_total: set.routed_total(),
            unmet_total: set.unmet_total(),
            total_cost: set.total_cost(),
            distance: DistanceStats::from_allocations(set.allocations()),
            utilization,
        }
    }

    #[inline]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    #[inline]
    pub fn routed_total(&self) -> Quantity {
        self.routed_total
    }

    #[inline]
    pub fn unmet_total(&self) -> Quantity {
        self.unmet_total
    }

    #[inline]
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    #[inline]
    pub fn distance(&self) -> Option<&DistanceStats> {
        self.distance.as_ref()
    }

    #[inline]
    pub fn utilization(&self) -> &[ProcessorUtilization] {
        &self.utilization
    }
}

/// Status of one merged run, keyed by (waste type, period).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunStatusEntry {
    waste_type: WasteType,
    period: Period,
    status: RunStatus,
}

impl RunStatusEntry {
    #[inline]
    pub fn waste_type(&self) -> WasteType {
        self.waste_type
    }

    #[inline]
    pub fn period(&self) -> Period {
        self.period
    }

    #[inline]
    pub fn status(&self) -> RunStatus {
        self.status
    }
}

/// Merged view over several runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationReport {
    total_cost: Cost,
    cost_by_waste_type: BTreeMap<WasteType, Cost>,
    routed_by_waste_type: BTreeMap<WasteType, Quantity>,
    unmet_by_waste_type: BTreeMap<WasteType, Quantity>,
    statuses: Vec<RunStatusEntry>,
    distance: Option<DistanceStats>,
    utilization: Vec<ProcessorUtilization>,
}

impl AllocationReport {
    #[inline]
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    #[inline]
    pub fn cost_by_waste_type(&self) -> &BTreeMap<WasteType, Cost> {
        &self.cost_by_waste_type
    }

    #[inline]
    pub fn routed_by_waste_type(&self) -> &BTreeMap<WasteType, Quantity> {
        &self.routed_by_waste_type
    }

    #[inline]
    pub fn unmet_by_waste_type(&self) -> &BTreeMap<WasteType, Quantity> {
        &self.unmet_by_waste_type
    }

    /// Sorted by waste type, then period.
    #[inline]
    pub fn statuses(&self) -> &[RunStatusEntry] {
        &self.statuses
    }

    pub fn status_of(&self, waste_type: WasteType, period: Period) -> Option<RunStatus> {
        self.statuses
            .iter()
            .find(|e| e.waste_type == waste_type && e.period == period)
            .map(|e| e.status)
    }

    #[inline]
    pub fn distance(&self) -> Option<&DistanceStats> {
        self.distance.as_ref()
    }

    #[inline]
    pub fn utilization(&self) -> &[ProcessorUtilization] {
        &self.utilization
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationAggregator {
    soft_overflow: bool,
}

impl AllocationAggregator {
    #[inline]
    pub fn new(soft_overflow: bool) -> Self {
        Self { soft_overflow }
    }

    pub fn aggregate(
        &self,
        problem: &Problem,
        sets: &[AllocationSet],
    ) -> Result<AllocationReport, AggregateError> {
        // Capacity is checked per period, summed across waste types.
        let periods: Vec<Period> = sets.iter().map(|s| s.period()).unique().sorted().collect();
        for &period in &periods {
            let in_period = sets.iter().filter(|s| s.period() == period);
            match AllocationValidator.validate_capacity_across(problem, in_period) {
                Ok(()) => {}
                Err(SolutionValidationError::CapacityExceeded(e)) if self.soft_overflow => {
                    warn!(%period, error = %e, "capacity overflow reported, not rejected");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut cost_by_waste_type: BTreeMap<WasteType, Cost> = BTreeMap::new();
        let mut routed_by_waste_type: BTreeMap<WasteType, Quantity> = BTreeMap::new();
        let mut unmet_by_waste_type: BTreeMap<WasteType, Quantity> = BTreeMap::new();
        let mut statuses = Vec::new();
        for set in sets {
            *cost_by_waste_type.entry(set.waste_type()).or_insert(0.0) += set.total_cost();
            let routed = routed_by_waste_type
                .entry(set.waste_type())
                .or_insert(Quantity::ZERO);
            *routed = routed.saturating_add(set.routed_total());
            let unmet = unmet_by_waste_type
                .entry(set.waste_type())
                .or_insert(Quantity::ZERO);
            *unmet = unmet.saturating_add(set.unmet_total());
            statuses.push(RunStatusEntry {
                waste_type: set.waste_type(),
                period: set.period(),
                status: set.status(),
            });
        }
        statuses.sort_by_key(|e| (e.waste_type, e.period));

        let utilization = periods
            .iter()
            .flat_map(|&period| {
                problem.processors().iter().map(move |q| (period, q))
            })
            .map(|(period, q)| {
                let received = sets
                    .iter()
                    .filter(|s| s.period() == period)
                    .map(|s| s.received_by(q.id()))
                    .sum();
                ProcessorUtilization::new(period, q.id(), received, q.capacity())
            })
            .collect();

        Ok(AllocationReport {
            total_cost: cost_by_waste_type.values().sum(),
            cost_by_waste_type,
            routed_by_waste_type,
            unmet_by_waste_type,
            statuses,
            distance: DistanceStats::from_allocations(
                sets.iter().flat_map(|s| s.allocations().iter()),
            ),
            utilization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use waste_flow_core::prelude::GeoPoint;
    use waste_flow_model::common::ProducerIdentifier;
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

    fn problem(cap: u64) -> Problem {
        let mut supply = BTreeMap::new();
        supply.insert(WasteType::Organic, Quantity::new(100));
        supply.insert(WasteType::Plastic, Quantity::new(100));
        Problem::from_entities(
            [Producer::new(pid(1), gp(41.40, 2.2), supply)],
            [Processor::new(prid(1), gp(41.42, 2.2), Quantity::new(cap))],
        )
        .unwrap()
    }

    fn run(wt: WasteType, kg: u64, km: f64) -> AllocationSet {
        AllocationSet::new(
            wt,
            Period::new(0),
            RunStatus::Optimal,
            vec![Allocation::new(
                pid(1),
                prid(1),
                wt,
                Period::new(0),
                Quantity::new(kg),
                Kilometers::new(km),
                km * 2.0,
            )],
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_merges_costs_and_statuses() {
        let problem = problem(300);
        let sets = vec![run(WasteType::Organic, 100, 3.0), run(WasteType::Plastic, 100, 5.0)];
        let report = AllocationAggregator::default()
            .aggregate(&problem, &sets)
            .unwrap();

        assert_eq!(report.cost_by_waste_type()[&WasteType::Organic], 600.0);
        assert_eq!(report.cost_by_waste_type()[&WasteType::Plastic], 1000.0);
        assert_eq!(report.total_cost(), 1600.0);
        assert_eq!(
            report.status_of(WasteType::Organic, Period::new(0)),
            Some(RunStatus::Optimal)
        );
        assert_eq!(
            report.routed_by_waste_type()[&WasteType::Plastic],
            Quantity::new(100)
        );
    }

    #[test]
    fn test_distance_stats() {
        let problem = problem(300);
        let sets = vec![run(WasteType::Organic, 100, 3.0), run(WasteType::Plastic, 100, 5.0)];
        let report = AllocationAggregator::default()
            .aggregate(&problem, &sets)
            .unwrap();
        let d = report.distance().unwrap();
        assert_eq!(d.min(), Kilometers::new(3.0));
        assert_eq!(d.max(), Kilometers::new(5.0));
        assert_eq!(d.mean(), Kilometers::new(4.0));
    }

    #[test]
    fn test_cross_type_overflow_is_an_error_by_default() {
        // Each run fits alone; together they exceed the shared budget.
        let problem = problem(150);
        let sets = vec![run(WasteType::Organic, 100, 3.0), run(WasteType::Plastic, 100, 5.0)];
        assert!(matches!(
            AllocationAggregator::default()
                .aggregate(&problem, &sets)
                .unwrap_err(),
            AggregateError::Solution(SolutionValidationError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn test_soft_overflow_reports_instead_of_rejecting() {
        let problem = problem(150);
        let sets = vec![run(WasteType::Organic, 100, 3.0), run(WasteType::Plastic, 100, 5.0)];
        let report = AllocationAggregator::new(true)
            .aggregate(&problem, &sets)
            .unwrap();
        let u = &report.utilization()[0];
        assert!(u.is_overloaded());
        assert_eq!(u.received(), Quantity::new(200));
        assert!((u.ratio() - 200.0 / 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_yields_empty_report() {
        let problem = problem(100);
        let report = AllocationAggregator::default()
            .aggregate(&problem, &[])
            .unwrap();
        assert_eq!(report.total_cost(), 0.0);
        assert!(report.distance().is_none());
        assert!(report.utilization().is_empty());
    }
}
