use crate::maximum_flow;
use crate::maximum_flow::capacity_scaling::CapacityScaling;
use crate::minimum_cost_flow::graph::Graph;
use crate::minimum_cost_flow::status::Status;
use num_traits::NumAssign;
use std::ops::Neg;

/// Computes an integer flow that realizes every vertex's supply while
/// respecting capacities and lower bounds, ignoring cost entirely. Builds a
/// super-source/super-sink max-flow network over the *client-visible*
/// direction of every edge (capacity = upper bound minus lower bound,
/// exactly as stored internally once `Graph::add_directed_edge` has folded
/// the lower bound in) and solves it with `CapacityScaling`; the resulting
/// per-edge flow is copied straight onto `graph`, so a caller that only
/// needs a feasible circulation (ignoring cost) can stop here.
///
/// Returns `Status::Infeasible` when the super-source cannot be saturated,
/// `Status::Unbalanced` when supply does not sum to zero, `Status::Optimal`
/// otherwise.
pub fn solve_feasible_circulation<Flow>(graph: &mut Graph<Flow>) -> Status
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy,
{
    if graph.is_unbalance() {
        return Status::Unbalanced;
    }
    if graph.num_nodes() == 0 {
        return Status::Optimal;
    }

    let mut flow_graph = maximum_flow::graph::Graph::default();
    flow_graph.add_nodes(graph.num_nodes());
    let source = flow_graph.add_node();
    let sink = flow_graph.add_node();

    let mut excesses = graph.b.clone();
    for (edge_id, edge) in graph.edges.iter().enumerate() {
        // client-visible direction: a negative-cost edge is stored reversed
        // internally, but feasibility only cares about true capacity flow.
        let (from, to) = if graph.is_reversed[edge_id] { (edge.to, edge.from) } else { (edge.from, edge.to) };
        excesses[from] -= graph.lowers[edge_id];
        excesses[to] += graph.lowers[edge_id];
        flow_graph.add_directed_edge(from, to, edge.upper);
    }

    let mut total_excess = Flow::zero();
    for u in 0..graph.num_nodes() {
        if excesses[u] > Flow::zero() {
            flow_graph.add_directed_edge(source, u, excesses[u]);
            total_excess += excesses[u];
        }
        if excesses[u] < Flow::zero() {
            flow_graph.add_directed_edge(u, sink, -excesses[u]);
        }
    }

    CapacityScaling::default().solve(source, sink, &mut flow_graph);

    if flow_graph.maximum_flow(source) < total_excess {
        return Status::Infeasible;
    }

    for edge_id in 0..graph.num_edges() {
        let edge_flow = flow_graph.get_edge(edge_id).unwrap().flow;
        graph.edges[edge_id].flow = if graph.is_reversed[edge_id] { graph.edges[edge_id].upper - edge_flow } else { edge_flow };
    }

    Status::Optimal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_arc_is_feasible() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        let e = graph.add_directed_edge(0, 1, 0, 5, 2).unwrap();
        graph.add_supply(0, 5);
        graph.add_demand(1, 5);

        assert_eq!(solve_feasible_circulation(&mut graph), Status::Optimal);
        assert_eq!(graph.get_edge(e).unwrap().flow, 5);
    }

    #[test]
    fn insufficient_capacity_is_infeasible() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        graph.add_directed_edge(0, 1, 0, 3, 1).unwrap();
        graph.add_supply(0, 5);
        graph.add_demand(1, 5);

        assert_eq!(solve_feasible_circulation(&mut graph), Status::Infeasible);
    }

    #[test]
    fn lower_bound_is_respected() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(3);
        let e0 = graph.add_directed_edge(0, 1, 2, 5, 10).unwrap();
        let e1 = graph.add_directed_edge(0, 2, 0, 5, 1).unwrap();
        let e2 = graph.add_directed_edge(1, 2, 0, 5, 1).unwrap();
        graph.add_supply(0, 3);
        graph.add_demand(2, 3);

        assert_eq!(solve_feasible_circulation(&mut graph), Status::Optimal);
        assert!(graph.get_edge(e0).unwrap().flow >= 2);
        let _ = (e1, e2);
    }
}
