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

use crate::common::{Period, ProcessorIdentifier, ProducerIdentifier, WasteType};
use serde::Serialize;
use std::collections::BTreeMap;
use waste_flow_core::prelude::{Cost, Kilometers, Quantity};

/// How a run's allocation was produced.
///
/// The exact solver and the greedy fallback share one output contract;
/// this tag is the only caller-visible difference between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// All supply routed at minimum cost.
    Optimal,
    /// Supply exceeds capacity; best achievable flow saturating all
    /// capacity.
    Partial,
    /// Produced by the greedy heuristic after a solver failure. Not
    /// guaranteed cost-optimal.
    GreedyFallback,
    /// Greedy heuristic, with supply left over after every processor
    /// saturated.
    GreedyPartial,
}

impl RunStatus {
    #[inline]
    pub fn is_exact(self) -> bool {
        matches!(self, RunStatus::Optimal | RunStatus::Partial)
    }

    #[inline]
    pub fn is_fallback(self) -> bool {
        !self.is_exact()
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Optimal => "optimal",
            RunStatus::Partial => "partial",
            RunStatus::GreedyFallback => "greedy-fallback",
            RunStatus::GreedyPartial => "greedy-partial",
        };
        write!(f, "{s}")
    }
}

/// Record of a solver failure that forced the greedy fallback. Kept on
/// the result so the failure is traceable, never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolverFailure {
    message: String,
}

impl SolverFailure {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for SolverFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// One routed producer→processor quantity for a waste type and period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    producer: ProducerIdentifier,
    processor: ProcessorIdentifier,
    waste_type: WasteType,
    period: Period,
    quantity: Quantity,
    distance: Kilometers,
    unit_cost: Cost,
    total_cost: Cost,
}

impl Allocation {
    /// Total cost is derived from quantity and unit cost at
    /// construction so the two can never drift apart.
    #[inline]
    pub fn new(
        producer: ProducerIdentifier,
        processor: ProcessorIdentifier,
        waste_type: WasteType,
        period: Period,
        quantity: Quantity,
        distance: Kilometers,
        unit_cost: Cost,
    ) -> Self {
        Self {
            producer,
            processor,
            waste_type,
            period,
            quantity,
            distance,
            unit_cost,
            total_cost: quantity.cost_at(unit_cost),
        }
    }

    #[inline]
    pub fn producer(&self) -> ProducerIdentifier {
        self.producer
    }

    #[inline]
    pub fn processor(&self) -> ProcessorIdentifier {
        self.processor
    }

    #[inline]
    pub fn waste_type(&self) -> WasteType {
        self.waste_type
    }

    #[inline]
    pub fn period(&self) -> Period {
        self.period
    }

    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    #[inline]
    pub fn distance(&self) -> Kilometers {
        self.distance
    }

    #[inline]
    pub fn unit_cost(&self) -> Cost {
        self.unit_cost
    }

    #[inline]
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }
}

/// The allocation produced by one run (one waste type, one period),
/// with its status tag and any unmet demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSet {
    waste_type: WasteType,
    period: Period,
    status: RunStatus,
    allocations: Vec<Allocation>,
    unmet_demand: BTreeMap<ProducerIdentifier, Quantity>,
    fallback_cause: Option<SolverFailure>,
}

impl AllocationSet {
    #[inline]
    pub fn new(
        waste_type: WasteType,
        period: Period,
        status: RunStatus,
        allocations: Vec<Allocation>,
        unmet_demand: BTreeMap<ProducerIdentifier, Quantity>,
    ) -> Self {
        Self {
            waste_type,
            period,
            status,
            allocations,
            unmet_demand,
            fallback_cause: None,
        }
    }

    #[inline]
    pub fn with_fallback_cause(mut self, cause: SolverFailure) -> Self {
        self.fallback_cause = Some(cause);
        self
    }

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

    #[inline]
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    #[inline]
    pub fn unmet_demand(&self) -> &BTreeMap<ProducerIdentifier, Quantity> {
        &self.unmet_demand
    }

    #[inline]
    pub fn fallback_cause(&self) -> Option<&SolverFailure> {
        self.fallback_cause.as_ref()
    }

    #[inline]
    pub fn is_fully_satisfied(&self) -> bool {
        self.unmet_demand.is_empty()
    }

    #[inline]
    pub fn routed_total(&self) -> Quantity {
        self.allocations.iter().map(|a| a.quantity()).sum()
    }

    #[inline]
    pub fn unmet_total(&self) -> Quantity {
        self.unmet_demand.values().copied().sum()
    }

    #[inline]
    pub fn total_cost(&self) -> Cost {
        self.allocations.iter().map(|a| a.total_cost()).sum()
    }

    /// Quantity this producer routed across all processors in the run.
    pub fn routed_by(&self, producer: ProducerIdentifier) -> Quantity {
        self.allocations
            .iter()
            .filter(|a| a.producer() == producer)
            .map(|a| a.quantity())
            .sum()
    }

    /// Quantity this processor received across all producers in the run.
    pub fn received_by(&self, processor: ProcessorIdentifier) -> Quantity {
        self.allocations
            .iter()
            .filter(|a| a.processor() == processor)
            .map(|a| a.quantity())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn pid(n: u32) -> ProducerIdentifier {
        ProducerIdentifier::new(n)
    }

    #[inline]
    fn prid(n: u32) -> ProcessorIdentifier {
        ProcessorIdentifier::new(n)
    }

    fn alloc(p: u32, q: u32, kg: u64, unit: Cost) -> Allocation {
        Allocation::new(
            pid(p),
            prid(q),
            WasteType::Organic,
            Period::new(0),
            Quantity::new(kg),
            Kilometers::new(unit / 2.0),
            unit,
        )
    }

    #[test]
    fn test_total_cost_derived_at_construction() {
        let a = alloc(1, 1, 10, 3.0);
        assert_eq!(a.total_cost(), 30.0);
    }

    #[test]
    fn test_set_totals() {
        let set = AllocationSet::new(
            WasteType::Organic,
            Period::new(0),
            RunStatus::Optimal,
            vec![alloc(1, 1, 100, 2.0), alloc(2, 1, 50, 4.0)],
            BTreeMap::new(),
        );
        assert_eq!(set.routed_total(), Quantity::new(150));
        assert_eq!(set.total_cost(), 400.0);
        assert!(set.is_fully_satisfied());
        assert_eq!(set.routed_by(pid(1)), Quantity::new(100));
        assert_eq!(set.received_by(prid(1)), Quantity::new(150));
    }

    #[test]
    fn test_unmet_total_and_fallback_cause() {
        let mut unmet = BTreeMap::new();
        unmet.insert(pid(2), Quantity::new(50));
        let set = AllocationSet::new(
            WasteType::Plastic,
            Period::new(3),
            RunStatus::GreedyPartial,
            vec![alloc(1, 1, 100, 2.0)],
            unmet,
        )
        .with_fallback_cause(SolverFailure::new("iteration limit exhausted"));

        assert!(!set.is_fully_satisfied());
        assert_eq!(set.unmet_total(), Quantity::new(50));
        assert!(set.status().is_fallback());
        assert_eq!(
            set.fallback_cause().unwrap().message(),
            "iteration limit exhausted"
        );
    }

    #[test]
    fn test_status_display_matches_wire_names() {
        assert_eq!(RunStatus::Optimal.to_string(), "optimal");
        assert_eq!(RunStatus::Partial.to_string(), "partial");
        assert_eq!(RunStatus::GreedyFallback.to_string(), "greedy-fallback");
        assert_eq!(RunStatus::GreedyPartial.to_string(), "greedy-partial");
    }
}
