use crate::maximum_flow::capacity_scaling::CapacityScaling;
use crate::maximum_flow::dinic::Dinic;
use crate::maximum_flow::edmonds_karp::EdmondsKarp;
use crate::maximum_flow::graph::Graph;
use crate::maximum_flow::push_relabel_fifo::PushRelabelFIFO;
use crate::maximum_flow::shortest_augmenting_path::ShortestAugmentingPath;
use crate::maximum_flow::status::Status;
use num_traits::NumAssign;

/// Selects a maximum-flow backend. Every named value from the external
/// interface is accepted; variants with no dedicated implementation in this
/// crate resolve to the closest backend that is implemented (see `resolve`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    EdmondsKarp,
    Dinic,
    DinicDynamicTrees,
    PushRelabelFifo,
    PushRelabelHighestFirst,
    PushRelabelPartialAugment,
    PushRelabelLowestFirst,
    PushRelabelMoveToFront,
    PushRelabelFifoDynamicTrees,
    CapacityScaling,
}

impl Algorithm {
    /// The backend this crate actually runs for a given requested algorithm.
    fn resolve(self) -> ResolvedBackend {
        match self {
            Algorithm::EdmondsKarp => ResolvedBackend::EdmondsKarp,
            Algorithm::Dinic | Algorithm::DinicDynamicTrees => ResolvedBackend::Dinic,
            Algorithm::PushRelabelFifo | Algorithm::PushRelabelFifoDynamicTrees => ResolvedBackend::PushRelabelFifo,
            Algorithm::PushRelabelHighestFirst | Algorithm::PushRelabelPartialAugment | Algorithm::PushRelabelLowestFirst | Algorithm::PushRelabelMoveToFront => ResolvedBackend::ShortestAugmentingPath,
            Algorithm::CapacityScaling => ResolvedBackend::CapacityScaling,
        }
    }
}

enum ResolvedBackend {
    EdmondsKarp,
    Dinic,
    PushRelabelFifo,
    ShortestAugmentingPath,
    CapacityScaling,
}

pub struct MaxFlowBuilder<Flow> {
    graph: Graph<Flow>,
    algorithm: Algorithm,
}

impl<Flow> Default for MaxFlowBuilder<Flow>
where
    Flow: NumAssign + Ord + Copy + Default,
{
    fn default() -> Self {
        Self { graph: Graph::default(), algorithm: Algorithm::Dinic }
    }
}

impl<Flow> MaxFlowBuilder<Flow>
where
    Flow: NumAssign + Ord + Copy + Default,
{
    pub fn algorithm(&mut self, algorithm: Algorithm) -> &mut Self {
        self.algorithm = algorithm;
        self
    }

    pub fn add_node(&mut self) -> usize {
        self.graph.add_node()
    }

    pub fn add_nodes(&mut self, num_nodes: usize) -> Vec<usize> {
        self.graph.add_nodes(num_nodes)
    }

    pub fn add_directed_edge(&mut self, from: usize, to: usize, upper: Flow) -> Option<usize> {
        self.graph.add_directed_edge(from, to, upper)
    }

    pub fn graph(&self) -> &Graph<Flow> {
        &self.graph
    }

    pub fn solve(&mut self, source: usize, sink: usize) -> Status {
        if source >= self.graph.num_nodes() || sink >= self.graph.num_nodes() || source == sink {
            return Status::BadInput;
        }

        match self.algorithm.resolve() {
            ResolvedBackend::EdmondsKarp => EdmondsKarp::default().solve(source, sink, &mut self.graph),
            ResolvedBackend::Dinic => Dinic::default().solve(source, sink, &mut self.graph),
            ResolvedBackend::PushRelabelFifo => PushRelabelFIFO::new(16).solve(source, sink, &mut self.graph),
            ResolvedBackend::ShortestAugmentingPath => ShortestAugmentingPath::default().solve(source, sink, &mut self.graph),
            ResolvedBackend::CapacityScaling => CapacityScaling::default().solve(source, sink, &mut self.graph),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resolved_backend_agrees_on_a_diamond() {
        let algorithms = [
            Algorithm::EdmondsKarp,
            Algorithm::Dinic,
            Algorithm::PushRelabelFifo,
            Algorithm::CapacityScaling,
        ];

        for algorithm in algorithms {
            let mut builder = MaxFlowBuilder::<i64>::default();
            builder.algorithm(algorithm);
            let nodes = builder.add_nodes(4);
            builder.add_directed_edge(nodes[0], nodes[1], 2);
            builder.add_directed_edge(nodes[0], nodes[2], 2);
            builder.add_directed_edge(nodes[1], nodes[3], 2);
            builder.add_directed_edge(nodes[2], nodes[3], 2);

            let status = builder.solve(nodes[0], nodes[3]);
            assert_eq!(status, Status::Optimal);
            assert_eq!(builder.graph().maximum_flow(nodes[0]), 4);
        }
    }

    #[test]
    fn rejects_source_equal_to_sink() {
        let mut builder = MaxFlowBuilder::<i64>::default();
        let nodes = builder.add_nodes(2);
        builder.add_directed_edge(nodes[0], nodes[1], 1);
        assert_eq!(builder.solve(nodes[0], nodes[0]), Status::BadInput);
    }
}
