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

//! Flow-network construction.
//!
//! One network per (waste type, period) run: a bipartite graph between
//! producers and processors wrapped by a single source and sink. Node
//! and arc insertion follow the ascending-id iteration order of the
//! containers, so the same problem always yields the same graph and the
//! solvers downstream stay deterministic.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use waste_flow_core::prelude::{haversine_km, Cost, Kilometers, Quantity, TransportCostModel};
use waste_flow_model::common::{ProcessorIdentifier, ProducerIdentifier, WasteType};
use waste_flow_model::prelude::Problem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowNode {
    Source,
    Sink,
    Producer(ProducerIdentifier),
    Processor(ProcessorIdentifier),
}

/// Arc attributes. `unit_cost` is the cost of moving one kilogram over
/// the arc; virtual source/sink arcs are free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowArc {
    capacity: Quantity,
    unit_cost: Cost,
    distance: Kilometers,
}

impl FlowArc {
    #[inline]
    fn free(capacity: Quantity) -> Self {
        Self {
            capacity,
            unit_cost: 0.0,
            distance: Kilometers::new(0.0),
        }
    }

    #[inline]
    fn transport(capacity: Quantity, distance: Kilometers, unit_cost: Cost) -> Self {
        Self {
            capacity,
            unit_cost,
            distance,
        }
    }

    #[inline]
    pub fn capacity(&self) -> Quantity {
        self.capacity
    }

    #[inline]
    pub fn unit_cost(&self) -> Cost {
        self.unit_cost
    }

    #[inline]
    pub fn distance(&self) -> Kilometers {
        self.distance
    }
}

/// The built instance for one run.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    waste_type: WasteType,
    graph: DiGraph<FlowNode, FlowArc>,
    source: NodeIndex,
    sink: NodeIndex,
    supply_total: Quantity,
    capacity_total: Quantity,
}

impl FlowNetwork {
    #[inline]
    pub fn waste_type(&self) -> WasteType {
        self.waste_type
    }

    #[inline]
    pub fn graph(&self) -> &DiGraph<FlowNode, FlowArc> {
        &self.graph
    }

    #[inline]
    pub fn source(&self) -> NodeIndex {
        self.source
    }

    #[inline]
    pub fn sink(&self) -> NodeIndex {
        self.sink
    }

    #[inline]
    pub fn supply_total(&self) -> Quantity {
        self.supply_total
    }

    #[inline]
    pub fn capacity_total(&self) -> Quantity {
        self.capacity_total
    }

    /// Total supply exceeds total capacity: an exact run can only be
    /// `Partial` at best.
    #[inline]
    pub fn is_over_constrained(&self) -> bool {
        self.supply_total > self.capacity_total
    }

    /// Producer→processor arcs in insertion (id) order.
    pub fn transport_arcs(
        &self,
    ) -> impl Iterator<Item = (EdgeIndex, ProducerIdentifier, ProcessorIdentifier, &FlowArc)> + '_
    {
        self.graph.edge_indices().filter_map(move |e| {
            let (u, v) = self.graph.edge_endpoints(e)?;
            match (&self.graph[u], &self.graph[v]) {
                (FlowNode::Producer(p), FlowNode::Processor(q)) => {
                    Some((e, *p, *q, &self.graph[e]))
                }
                _ => None,
            }
        })
    }

    /// The supply arc feeding the given producer node, if any.
    pub fn supply_of(&self, producer: ProducerIdentifier) -> Quantity {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (u, v) = self.graph.edge_endpoints(e)?;
                match (&self.graph[u], &self.graph[v]) {
                    (FlowNode::Source, FlowNode::Producer(p)) if *p == producer => {
                        Some(self.graph[e].capacity())
                    }
                    _ => None,
                }
            })
            .next()
            .unwrap_or(Quantity::ZERO)
    }
}

/// Builds one [`FlowNetwork`] per waste type from an immutable problem
/// snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FlowNetworkBuilder<'a> {
    problem: &'a Problem,
    cost_model: TransportCostModel,
}

impl<'a> FlowNetworkBuilder<'a> {
    #[inline]
    pub fn new(problem: &'a Problem, cost_model: TransportCostModel) -> Self {
        Self {
            problem,
            cost_model,
        }
    }

    /// Zero-supply producers are left out entirely; they cannot carry
    /// flow and must not disturb the arc ordering.
    pub fn build(&self, waste_type: WasteType) -> FlowNetwork {
        let mut graph = DiGraph::new();
        let source = graph.add_node(FlowNode::Source);
        let sink = graph.add_node(FlowNode::Sink);

        let processors: Vec<_> = self
            .problem
            .processors()
            .iter()
            .filter(|q| !q.capacity().is_zero())
            .map(|q| (graph.add_node(FlowNode::Processor(q.id())), q))
            .collect();

        let mut supply_total = Quantity::ZERO;
        for producer in self.problem.producers().iter() {
            let supply = producer.supply_of(waste_type);
            if supply.is_zero() {
                continue;
            }
            supply_total = supply_total.saturating_add(supply);

            let node = graph.add_node(FlowNode::Producer(producer.id()));
            graph.add_edge(source, node, FlowArc::free(supply));

            for (pnode, processor) in &processors {
                let distance = haversine_km(producer.location(), processor.location());
                let unit_cost = self.cost_model.unit_cost(distance);
                let capacity = supply.min(processor.capacity());
                graph.add_edge(
                    node,
                    *pnode,
                    FlowArc::transport(capacity, distance, unit_cost),
                );
            }
        }

        for (pnode, processor) in &processors {
            graph.add_edge(*pnode, sink, FlowArc::free(processor.capacity()));
        }

        FlowNetwork {
            waste_type,
            graph,
            source,
            sink,
            supply_total,
            capacity_total: self.problem.total_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use waste_flow_core::prelude::GeoPoint;
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

    fn build(problem: &Problem, wt: WasteType) -> FlowNetwork {
        FlowNetworkBuilder::new(problem, TransportCostModel::default()).build(wt)
    }

    #[test]
    fn test_bipartite_shape() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 100), producer(2, 41.38, 50)],
            [processor(1, 41.42, 200), processor(2, 41.45, 80)],
        )
        .unwrap();
        let net = build(&problem, WasteType::Organic);

        // source + sink + 2 producers + 2 processors
        assert_eq!(net.graph().node_count(), 6);
        // 2 supply arcs + 2x2 transport arcs + 2 sink arcs
        assert_eq!(net.graph().edge_count(), 8);
        assert_eq!(net.transport_arcs().count(), 4);
        assert_eq!(net.supply_total(), Quantity::new(150));
        assert_eq!(net.capacity_total(), Quantity::new(280));
        assert!(!net.is_over_constrained());
    }

    #[test]
    fn test_zero_supply_producer_is_excluded() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 100), producer(2, 41.38, 0)],
            [processor(1, 41.42, 200)],
        )
        .unwrap();
        let net = build(&problem, WasteType::Organic);

        assert_eq!(net.graph().node_count(), 4);
        assert_eq!(net.transport_arcs().count(), 1);
        assert_eq!(net.supply_of(pid(2)), Quantity::ZERO);
        assert_eq!(net.supply_of(pid(1)), Quantity::new(100));
    }

    #[test]
    fn test_transport_capacity_is_pair_minimum() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 100)],
            [processor(1, 41.42, 30), processor(2, 41.45, 500)],
        )
        .unwrap();
        let net = build(&problem, WasteType::Organic);

        let caps: Vec<_> = net
            .transport_arcs()
            .map(|(_, _, q, arc)| (q, arc.capacity()))
            .collect();
        assert!(caps.contains(&(prid(1), Quantity::new(30))));
        assert!(caps.contains(&(prid(2), Quantity::new(100))));
    }

    #[test]
    fn test_transport_cost_is_distance_times_rate() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 100)],
            [processor(1, 41.42, 200)],
        )
        .unwrap();
        let net = build(&problem, WasteType::Organic);
        let (_, _, _, arc) = net.transport_arcs().next().unwrap();
        assert!((arc.unit_cost() - arc.distance().get() * 2.0).abs() < 1e-12);
        assert!(arc.unit_cost() > 0.0);
    }

    #[test]
    fn test_over_constrained_tagging() {
        let problem = Problem::from_entities(
            [producer(1, 41.40, 100), producer(2, 41.38, 100)],
            [processor(1, 41.42, 150)],
        )
        .unwrap();
        let net = build(&problem, WasteType::Organic);
        assert!(net.is_over_constrained());
    }
}
