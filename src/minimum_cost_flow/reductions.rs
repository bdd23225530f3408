use crate::minimum_cost_flow::graph::Graph;
use crate::minimum_cost_flow::status::Status;
use num_traits::{Bounded, CheckedAdd, NumAssign};
use std::ops::Neg;

/// Synthetic vertices and edges added by a multi-terminal reduction. The
/// synthetic edges were appended to `graph` after every client edge, so a
/// caller that remembers the client edge count from before calling this
/// function can simply ignore edge indices at or past it when reading back
/// `graph.get_edge(..)`: there is no sentinel to dereference because the
/// synthetic edges never claim to represent a client edge in the first
/// place.
pub struct MultiTerminalReduction {
    pub super_source: usize,
    pub super_sink: usize,
    pub synthetic_edges: Vec<usize>,
}

/// Reduces a (sources, sinks) minimum-cost maximum-flow problem to the
/// single-supply form the cost-scaling solver consumes. Adds a super-source
/// `S` and super-sink `T`; `S -> s` and `t -> T` arcs get huge capacity and a
/// huge *negative* cost (`-C_huge`) so the solver saturates them, and
/// therefore maximizes total flow, before it optimizes cost among maximum
/// flows. Two zero-cost `S <-> T` arcs absorb any of `S`'s huge supply that
/// real sources/sinks cannot carry, so the reduced problem is always
/// balanced and feasible by construction.
///
/// `H`, the per-arc huge capacity, is the (saturating) sum of every edge's
/// capacity already in `graph`, a safe upper bound on any achievable flow.
/// `C_huge = 1 + sum(|cost(e)|)` over every edge already in `graph` (every
/// edge cost stored in `graph` is already non-negative, see
/// `Graph::add_directed_edge`, so this is a direct sum, not an abs-value
/// pass). If accumulating `C_huge` overflows `Flow`, this fails with
/// `Status::Overflow` rather than silently wrapping; `H` saturates instead,
/// since a looser-than-necessary flow bound is still correct.
pub fn reduce_min_cost_max_flow<Flow>(graph: &mut Graph<Flow>, sources: &[usize], sinks: &[usize]) -> Result<MultiTerminalReduction, Status>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + CheckedAdd + Bounded,
{
    if sources.is_empty() || sinks.is_empty() {
        return Err(Status::BadInput);
    }
    for &s in sources.iter().chain(sinks.iter()) {
        if s >= graph.num_nodes() {
            return Err(Status::BadInput);
        }
    }
    let has_duplicates = |xs: &[usize]| {
        let mut seen = xs.to_vec();
        seen.sort_unstable();
        seen.windows(2).any(|w| w[0] == w[1])
    };
    if has_duplicates(sources) || has_duplicates(sinks) {
        return Err(Status::BadInput);
    }
    if sources.iter().any(|s| sinks.contains(s)) {
        return Err(Status::BadInput);
    }

    let mut huge_capacity = Flow::zero();
    for edge_id in 0..graph.num_edges() {
        let upper = graph.get_edge(edge_id).unwrap().upper;
        huge_capacity = huge_capacity.checked_add(&upper).unwrap_or(Flow::max_value());
    }
    if huge_capacity == Flow::zero() {
        huge_capacity = Flow::one();
    }

    let mut sum_abs_cost = Flow::zero();
    for edge_id in 0..graph.num_edges() {
        let cost = graph.get_edge(edge_id).unwrap().cost;
        let magnitude = if cost < Flow::zero() { -cost } else { cost };
        sum_abs_cost = sum_abs_cost.checked_add(&magnitude).ok_or(Status::Overflow)?;
    }
    let huge_cost = sum_abs_cost.checked_add(&Flow::one()).ok_or(Status::Overflow)?;

    let super_source = graph.add_node();
    let super_sink = graph.add_node();
    let mut synthetic_edges = Vec::with_capacity(sources.len() + sinks.len() + 2);

    for &s in sources {
        synthetic_edges.push(graph.add_directed_edge(super_source, s, Flow::zero(), huge_capacity, -huge_cost).unwrap());
    }
    for &t in sinks {
        synthetic_edges.push(graph.add_directed_edge(t, super_sink, Flow::zero(), huge_capacity, -huge_cost).unwrap());
    }
    synthetic_edges.push(graph.add_directed_edge(super_source, super_sink, Flow::zero(), huge_capacity, Flow::zero()).unwrap());
    synthetic_edges.push(graph.add_directed_edge(super_sink, super_source, Flow::zero(), huge_capacity, Flow::zero()).unwrap());

    graph.add_supply(super_source, huge_capacity);
    graph.add_demand(super_sink, huge_capacity);

    Ok(MultiTerminalReduction { super_source, super_sink, synthetic_edges })
}

/// (source, sink) minimum-cost maximum-flow, reduced by wrapping both
/// endpoints in singleton sets and delegating to
/// `reduce_min_cost_max_flow`.
pub fn reduce_single_source_sink<Flow>(graph: &mut Graph<Flow>, source: usize, sink: usize) -> Result<MultiTerminalReduction, Status>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + CheckedAdd + Bounded,
{
    if source == sink {
        return Err(Status::BadInput);
    }
    reduce_min_cost_max_flow(graph, &[source], &[sink])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimum_cost_flow::cost_scaling_push_relabel::CostScalingPushRelabel;

    #[test]
    fn single_source_sink_routes_through_the_cheaper_parallel_edge() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        let cheap = graph.add_directed_edge(0, 1, 0, 3, 1).unwrap();
        let expensive = graph.add_directed_edge(0, 1, 0, 3, 4).unwrap();

        let reduction = reduce_single_source_sink(&mut graph, 0, 1).unwrap();
        let status = CostScalingPushRelabel::default().solve(&mut graph);
        assert_eq!(status, Status::Optimal);

        assert_eq!(graph.get_edge(cheap).unwrap().flow, 3);
        assert_eq!(graph.get_edge(expensive).unwrap().flow, 3);
        let _ = reduction;
    }

    #[test]
    fn rejects_source_equal_to_sink() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(1);
        assert_eq!(reduce_single_source_sink(&mut graph, 0, 0).unwrap_err(), Status::BadInput);
    }

    #[test]
    fn multi_terminal_saturates_both_disjoint_paths() {
        // sources = {0, 1}, sinks = {3, 4}, 0->2->3 and 1->2->4, unit capacity.
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(5);
        let e02 = graph.add_directed_edge(0, 2, 0, 1, 1).unwrap();
        let e23 = graph.add_directed_edge(2, 3, 0, 1, 1).unwrap();
        let e12 = graph.add_directed_edge(1, 2, 0, 1, 1).unwrap();
        let e24 = graph.add_directed_edge(2, 4, 0, 1, 1).unwrap();

        reduce_min_cost_max_flow(&mut graph, &[0, 1], &[3, 4]).unwrap();
        let status = CostScalingPushRelabel::default().solve(&mut graph);
        assert_eq!(status, Status::Optimal);

        assert_eq!(graph.get_edge(e02).unwrap().flow, 1);
        assert_eq!(graph.get_edge(e23).unwrap().flow, 1);
        assert_eq!(graph.get_edge(e12).unwrap().flow, 1);
        assert_eq!(graph.get_edge(e24).unwrap().flow, 1);
    }
}
