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

//! Exact min-cost-flow solver.
//!
//! Successive shortest paths: starting from zero flow, repeatedly find
//! the cheapest augmenting source→sink path in the residual graph and
//! push the bottleneck amount along it. Residual arcs come in two
//! directions per underlying arc — `Up` (room to increase, original
//! cost) and `Down` (flow to cancel, negated cost) — so path search is
//! Bellman–Ford, which tolerates the negative reverse costs. Arcs are
//! relaxed in fixed index order with a strict-improvement rule, making
//! the whole run deterministic for a fixed input.

use crate::err::{IterationLimitError, ResidualPathError, SolverError};
use crate::network::FlowNetwork;
use petgraph::graph::EdgeIndex;
use waste_flow_core::prelude::Quantity;

/// Strict-improvement threshold for Bellman–Ford relaxation.
const EPSILON: f64 = 1e-9;

/// Augmentations before the solver gives up. Each augmentation
/// saturates at least one arc, so any sane instance converges far
/// below this.
pub const DEFAULT_ITERATION_LIMIT: u64 = 100_000;

/// Which side of an underlying arc a residual step uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResidueDirection {
    /// Forward: flow can still increase.
    Up,
    /// Backward: existing flow can be cancelled, at negated cost.
    Down,
}

/// Per-arc flows of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutcome {
    flows: Vec<u64>,
    routed: Quantity,
    iterations: u64,
}

impl FlowOutcome {
    #[inline]
    pub fn flow(&self, arc: EdgeIndex) -> Quantity {
        Quantity::new(self.flows[arc.index()])
    }

    /// Total amount that reached the sink.
    #[inline]
    pub fn routed(&self) -> Quantity {
        self.routed
    }

    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinCostFlowSolver {
    iteration_limit: u64,
}

impl Default for MinCostFlowSolver {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_ITERATION_LIMIT)
    }
}

impl MinCostFlowSolver {
    #[inline]
    pub fn new(iteration_limit: u64) -> Self {
        Self { iteration_limit }
    }

    #[inline]
    pub fn iteration_limit(&self) -> u64 {
        self.iteration_limit
    }

    /// Runs the flow to completion: stops when no augmenting path is
    /// left, which is either full supply routed or every path
    /// saturated. Feasibility policy is the caller's concern.
    pub fn solve(&self, network: &FlowNetwork) -> Result<FlowOutcome, SolverError> {
        let graph = network.graph();
        let n = graph.node_count();
        let m = graph.edge_count();
        let source = network.source().index();
        let sink = network.sink().index();

        let mut flows = vec![0u64; m];
        let mut iterations = 0u64;

        loop {
            if iterations >= self.iteration_limit {
                return Err(IterationLimitError::new(self.iteration_limit).into());
            }
            iterations += 1;

            // Bellman-Ford over the residual arcs.
            let mut dist = vec![f64::INFINITY; n];
            let mut pred: Vec<Option<(EdgeIndex, ResidueDirection)>> = vec![None; n];
            dist[source] = 0.0;

            for _ in 0..n {
                let mut relaxed = false;
                for e in graph.edge_indices() {
                    let Some((u, v)) = graph.edge_endpoints(e) else {
                        continue;
                    };
                    let arc = &graph[e];
                    let f = flows[e.index()];

                    if f < arc.capacity().get() && dist[u.index()].is_finite() {
                        let candidate = dist[u.index()] + arc.unit_cost();
                        if candidate < dist[v.index()] - EPSILON {
                            dist[v.index()] = candidate;
                            pred[v.index()] = Some((e, ResidueDirection::Up));
                            relaxed = true;
                        }
                    }
                    if f > 0 && dist[v.index()].is_finite() {
                        let candidate = dist[v.index()] - arc.unit_cost();
                        if candidate < dist[u.index()] - EPSILON {
                            dist[u.index()] = candidate;
                            pred[u.index()] = Some((e, ResidueDirection::Down));
                            relaxed = true;
                        }
                    }
                }
                if !relaxed {
                    break;
                }
            }

            if !dist[sink].is_finite() {
                break;
            }

            // Trace the path sink→source through the predecessor chain.
            let mut path: Vec<(EdgeIndex, ResidueDirection)> = Vec::new();
            let mut node = network.sink();
            while node != network.source() {
                if path.len() > m {
                    return Err(ResidualPathError::new(
                        "predecessor chain does not reach the source",
                    )
                    .into());
                }
                let Some((e, dir)) = pred[node.index()] else {
                    return Err(
                        ResidualPathError::new("reachable node without a predecessor").into()
                    );
                };
                let Some((u, v)) = graph.edge_endpoints(e) else {
                    return Err(ResidualPathError::new("predecessor references a dangling arc")
                        .into());
                };
                node = match dir {
                    ResidueDirection::Up => u,
                    ResidueDirection::Down => v,
                };
                path.push((e, dir));
            }

            // Push the bottleneck amount along the path.
            let mut amount = u64::MAX;
            for &(e, dir) in &path {
                let residual = match dir {
                    ResidueDirection::Up => graph[e].capacity().get() - flows[e.index()],
                    ResidueDirection::Down => flows[e.index()],
                };
                amount = amount.min(residual);
            }
            if amount == 0 {
                return Err(ResidualPathError::new("augmenting path with zero residual").into());
            }
            for &(e, dir) in &path {
                match dir {
                    ResidueDirection::Up => flows[e.index()] += amount,
                    ResidueDirection::Down => flows[e.index()] -= amount,
                }
            }
        }

        let routed = graph
            .edge_indices()
            .filter(|&e| {
                graph
                    .edge_endpoints(e)
                    .is_some_and(|(u, _)| u == network.source())
            })
            .map(|e| flows[e.index()])
            .sum();

        Ok(FlowOutcome {
            flows,
            routed: Quantity::new(routed),
            iterations,
        })
    }
}
