use crate::minimum_cost_flow::cost_scaling_push_relabel::CostScalingPushRelabel;
use crate::minimum_cost_flow::cycle_canceling::CycleCanceling;
use crate::minimum_cost_flow::graph::Graph;
use crate::minimum_cost_flow::reductions::{self, MultiTerminalReduction};
use crate::minimum_cost_flow::status::Status;
use num_traits::{Bounded, CheckedAdd, FromPrimitive, NumAssign, ToPrimitive};
use std::ops::Neg;

/// Configuration surface for the minimum-cost-flow solver family: a
/// chainable builder over `Graph`, mirroring the teacher's own
/// constructor-parameter pattern (`CostScalingPushRelabel::new(alpha)`,
/// `PrimalNetworkSimplex::solve(&mut pivot_rule, ..)`) rather than env vars
/// or config files. `integer_network` and `integer_costs` both default to
/// `true`, selecting the integer-only cost-scaling core. Setting either to
/// `false` selects the cycle-canceling fallback for non-integral inputs.
pub struct MinCostFlowBuilder<Flow> {
    graph: Graph<Flow>,
    integer_network: bool,
    integer_costs: bool,
    scaling_factor: Flow,
}

impl<Flow> Default for MinCostFlowBuilder<Flow>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + Default + FromPrimitive,
{
    fn default() -> Self {
        Self { graph: Graph::default(), integer_network: true, integer_costs: true, scaling_factor: Flow::from_isize(16).unwrap() }
    }
}

impl<Flow> MinCostFlowBuilder<Flow>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + Default + FromPrimitive + ToPrimitive,
{
    pub fn integer_network(&mut self, yes: bool) -> &mut Self {
        self.integer_network = yes;
        self
    }

    pub fn integer_costs(&mut self, yes: bool) -> &mut Self {
        self.integer_costs = yes;
        self
    }

    /// Overrides the cost-scaling solver's default scaling factor (16); must be `> 1`.
    pub fn scaling_factor(&mut self, alpha: Flow) -> &mut Self {
        self.scaling_factor = alpha;
        self
    }

    pub fn add_node(&mut self) -> usize {
        self.graph.add_node()
    }

    pub fn add_nodes(&mut self, num_nodes: usize) -> Vec<usize> {
        self.graph.add_nodes(num_nodes)
    }

    pub fn add_supply(&mut self, u: usize, supply: Flow) {
        self.graph.add_supply(u, supply)
    }

    pub fn add_demand(&mut self, u: usize, demand: Flow) {
        self.graph.add_demand(u, demand)
    }

    pub fn add_directed_edge(&mut self, from: usize, to: usize, lower: Flow, upper: Flow, cost: Flow) -> Option<usize> {
        self.graph.add_directed_edge(from, to, lower, upper, cost)
    }

    pub fn graph(&self) -> &Graph<Flow> {
        &self.graph
    }

    /// Solves the single-supply problem already staged on `graph` (the
    /// caller is responsible for any (source, sink)/(sources, sinks)
    /// reduction, see `solve_single_source_sink`/`solve_multi_terminal`
    /// below for the common case).
    pub fn solve(&mut self) -> Status {
        if self.integer_network && self.integer_costs {
            CostScalingPushRelabel::new(self.scaling_factor).solve(&mut self.graph)
        } else {
            CycleCanceling::default().solve(&mut self.graph)
        }
    }
}

impl<Flow> MinCostFlowBuilder<Flow>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + Default + FromPrimitive + ToPrimitive + CheckedAdd + Bounded,
{
    /// Reduces a (source, sink) minimum-cost maximum-flow problem
    /// to single-supply form and solves it.
    pub fn solve_single_source_sink(&mut self, source: usize, sink: usize) -> Result<MultiTerminalReduction, Status> {
        let reduction = reductions::reduce_single_source_sink(&mut self.graph, source, sink)?;
        match self.solve() {
            Status::Optimal => Ok(reduction),
            status => Err(status),
        }
    }

    /// Reduces a (sources, sinks) minimum-cost maximum-flow problem
    /// to single-supply form and solves it.
    pub fn solve_multi_terminal(&mut self, sources: &[usize], sinks: &[usize]) -> Result<MultiTerminalReduction, Status> {
        let reduction = reductions::reduce_min_cost_max_flow(&mut self.graph, sources, sinks)?;
        match self.solve() {
            Status::Optimal => Ok(reduction),
            status => Err(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selects_cost_scaling_and_solves_the_single_arc_instance() {
        let mut builder = MinCostFlowBuilder::<i64>::default();
        let nodes = builder.add_nodes(2);
        let e = builder.add_directed_edge(nodes[0], nodes[1], 0, 5, 2).unwrap();
        builder.add_supply(nodes[0], 5);
        builder.add_demand(nodes[1], 5);

        assert_eq!(builder.solve(), Status::Optimal);
        assert_eq!(builder.graph().get_edge(e).unwrap().flow, 5);
        assert_eq!(builder.graph().minimum_cost(), 10);
    }

    #[test]
    fn integer_costs_false_selects_cycle_canceling_and_agrees_on_cost() {
        let build = |builder: &mut MinCostFlowBuilder<i64>| {
            let nodes = builder.add_nodes(2);
            builder.add_directed_edge(nodes[0], nodes[1], 0, 3, 1).unwrap();
            builder.add_directed_edge(nodes[0], nodes[1], 0, 3, 4).unwrap();
            builder.add_supply(nodes[0], 4);
            builder.add_demand(nodes[1], 4);
        };

        let mut default_builder = MinCostFlowBuilder::<i64>::default();
        build(&mut default_builder);
        assert_eq!(default_builder.solve(), Status::Optimal);

        let mut fallback_builder = MinCostFlowBuilder::<i64>::default();
        fallback_builder.integer_costs(false);
        build(&mut fallback_builder);
        assert_eq!(fallback_builder.solve(), Status::Optimal);

        assert_eq!(default_builder.graph().minimum_cost(), fallback_builder.graph().minimum_cost());
    }

    #[test]
    fn solve_single_source_sink_routes_the_cheaper_parallel_edge() {
        let mut builder = MinCostFlowBuilder::<i64>::default();
        let nodes = builder.add_nodes(2);
        let cheap = builder.add_directed_edge(nodes[0], nodes[1], 0, 3, 1).unwrap();
        let expensive = builder.add_directed_edge(nodes[0], nodes[1], 0, 3, 4).unwrap();

        let reduction = builder.solve_single_source_sink(nodes[0], nodes[1]).unwrap();
        assert_eq!(builder.graph().get_edge(cheap).unwrap().flow, 3);
        assert_eq!(builder.graph().get_edge(expensive).unwrap().flow, 3);
        let _ = reduction;
    }
}
