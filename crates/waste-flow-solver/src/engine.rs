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

//! Run orchestration.
//!
//! One `optimize` call is a pure function of an immutable problem
//! snapshot and a config value: build the network, solve exactly, fall
//! back to greedy on solver failure, validate the invariants of
//! whatever came out. `optimize_batch` fans independent runs out over
//! rayon and merges the survivors into one report.

use crate::aggregate::{AllocationAggregator, AllocationReport, OptimizationSummary};
use crate::err::{AggregateError, InfeasibleError, OptimizeError};
use crate::greedy::GreedyAllocator;
use crate::mincost::{FlowOutcome, MinCostFlowSolver, DEFAULT_ITERATION_LIMIT};
use crate::network::{FlowNetwork, FlowNetworkBuilder};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, warn};
use waste_flow_core::prelude::{Cost, Quantity, TransportCostModel, DEFAULT_COST_PER_KM};
use waste_flow_model::common::{Period, WasteType};
use waste_flow_model::prelude::{
    Allocation, AllocationSet, AllocationValidator, Problem, RunStatus, SolverFailure,
};

/// Per-run knobs. A plain value handed into `optimize`; there is no
/// process-global configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeConfig {
    /// Transport rate, currency per kilometer per kilogram.
    pub cost_per_km: Cost,
    /// Augmentation budget for the exact solver.
    pub solver_iteration_limit: u64,
    /// Accept supply > capacity and return a `Partial` result instead
    /// of an infeasibility error.
    pub allow_partial: bool,
    /// Report cross-waste-type capacity overflow during aggregation
    /// instead of rejecting it.
    pub soft_overflow: bool,
}

impl Default for OptimizeConfig {
    #[inline]
    fn default() -> Self {
        Self {
            cost_per_km: DEFAULT_COST_PER_KM,
            solver_iteration_limit: DEFAULT_ITERATION_LIMIT,
            allow_partial: false,
            soft_overflow: false,
        }
    }
}

impl OptimizeConfig {
    #[inline]
    pub fn cost_model(&self) -> TransportCostModel {
        TransportCostModel::new(self.cost_per_km)
    }
}

/// A finished run: the allocation set plus its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    set: AllocationSet,
    summary: OptimizationSummary,
}

impl OptimizationResult {
    #[inline]
    pub fn set(&self) -> &AllocationSet {
        &self.set
    }

    #[inline]
    pub fn summary(&self) -> &OptimizationSummary {
        &self.summary
    }

    #[inline]
    pub fn into_set(self) -> AllocationSet {
        self.set
    }
}

/// One requested (waste type, period) combination of a batch.
#[derive(Debug)]
pub struct BatchRun {
    waste_type: WasteType,
    period: Period,
    result: Result<OptimizationResult, OptimizeError>,
}

impl BatchRun {
    #[inline]
    pub fn waste_type(&self) -> WasteType {
        self.waste_type
    }

    #[inline]
    pub fn period(&self) -> Period {
        self.period
    }

    #[inline]
    pub fn result(&self) -> Result<&OptimizationResult, &OptimizeError> {
        self.result.as_ref()
    }
}

/// Outcome of a batch: every run with its individual result, plus the
/// aggregated report over the successful ones. Failures stay visible
/// on the run, never swallowed by the merge.
#[derive(Debug)]
pub struct BatchOutcome {
    runs: Vec<BatchRun>,
    report: Result<AllocationReport, AggregateError>,
}

impl BatchOutcome {
    /// Runs in deterministic order: waste type, then period.
    #[inline]
    pub fn runs(&self) -> &[BatchRun] {
        &self.runs
    }

    #[inline]
    pub fn report(&self) -> Result<&AllocationReport, &AggregateError> {
        self.report.as_ref()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Optimizer {
    config: OptimizeConfig,
}

impl Optimizer {
    #[inline]
    pub fn new(config: OptimizeConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &OptimizeConfig {
        &self.config
    }

    /// Runs a single (waste type, period) optimization.
    pub fn optimize(
        &self,
        problem: &Problem,
        waste_type: WasteType,
        period: Period,
    ) -> Result<OptimizationResult, OptimizeError> {
        let cost_model = self.config.cost_model();
        let network = FlowNetworkBuilder::new(problem, cost_model).build(waste_type);
        info!(
            %waste_type,
            %period,
            supply = %network.supply_total(),
            capacity = %network.capacity_total(),
            "starting optimization run"
        );

        if network.is_over_constrained() && !self.config.allow_partial {
            return Err(InfeasibleError::new(
                waste_type,
                network.supply_total(),
                network.capacity_total(),
            )
            .into());
        }

        let solver = MinCostFlowSolver::new(self.config.solver_iteration_limit);
        let set = match solver.solve(&network) {
            Ok(outcome) => extract_allocations(&network, &outcome, period),
            Err(err) => {
                warn!(%waste_type, %period, error = %err, "exact solver failed, greedy fallback");
                GreedyAllocator::new(cost_model)
                    .allocate(problem, waste_type, period)
                    .with_fallback_cause(SolverFailure::new(err.to_string()))
            }
        };

        AllocationValidator.validate(problem, &set)?;
        let summary = OptimizationSummary::of(problem, &set);
        Ok(OptimizationResult { set, summary })
    }

    /// Runs independent combinations in parallel. Requests are
    /// deduplicated and sorted, so the output order never depends on
    /// scheduling.
    pub fn optimize_batch(
        &self,
        problem: &Problem,
        requests: &[(WasteType, Period)],
    ) -> BatchOutcome {
        let mut requests: Vec<_> = requests.to_vec();
        requests.sort();
        requests.dedup();

        let runs: Vec<BatchRun> = requests
            .par_iter()
            .map(|&(waste_type, period)| BatchRun {
                waste_type,
                period,
                result: self.optimize(problem, waste_type, period),
            })
            .collect();

        let completed: Vec<AllocationSet> = runs
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .map(|r| r.set().clone())
            .collect();
        let report =
            AllocationAggregator::new(self.config.soft_overflow).aggregate(problem, &completed);

        BatchOutcome { runs, report }
    }

    /// All waste types for one period.
    pub fn optimize_period(&self, problem: &Problem, period: Period) -> BatchOutcome {
        let requests: Vec<_> = WasteType::ALL.iter().map(|&wt| (wt, period)).collect();
        self.optimize_batch(problem, &requests)
    }
}

/// Translates per-arc flows back into allocation records. Unrouted
/// supply becomes unmet demand; the status tag says whether the run
/// was exact-complete or capacity-bound.
fn extract_allocations(
    network: &FlowNetwork,
    outcome: &FlowOutcome,
    period: Period,
) -> AllocationSet {
    let mut allocations = Vec::new();
    let mut routed_by: BTreeMap<_, Quantity> = BTreeMap::new();

    for (e, producer, processor, arc) in network.transport_arcs() {
        let quantity = outcome.flow(e);
        if quantity.is_zero() {
            continue;
        }
        allocations.push(Allocation::new(
            producer,
            processor,
            network.waste_type(),
            period,
            quantity,
            arc.distance(),
            arc.unit_cost(),
        ));
        let routed = routed_by.entry(producer).or_insert(Quantity::ZERO);
        *routed = routed.saturating_add(quantity);
    }

    let mut unmet = BTreeMap::new();
    for (producer, routed) in &routed_by {
        let left = network.supply_of(*producer).saturating_sub(*routed);
        if !left.is_zero() {
            unmet.insert(*producer, left);
        }
    }
    // Producers whose supply went entirely unrouted have no transport
    // flow at all and are invisible above.
    for node in network.graph().node_indices() {
        if let crate::network::FlowNode::Producer(p) = network.graph()[node] {
            if !routed_by.contains_key(&p) {
                let supply = network.supply_of(p);
                if !supply.is_zero() {
                    unmet.insert(p, supply);
                }
            }
        }
    }

    let status = if unmet.is_empty() {
        RunStatus::Optimal
    } else {
        RunStatus::Partial
    };
    AllocationSet::new(network.waste_type(), period, status, allocations, unmet)
}
