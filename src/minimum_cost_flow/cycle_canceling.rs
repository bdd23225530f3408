use crate::minimum_cost_flow::circulation;
use crate::minimum_cost_flow::graph::Graph;
use crate::minimum_cost_flow::residual::ResidualGraph;
use crate::minimum_cost_flow::status::Status;
use num_traits::NumAssign;
use std::ops::Neg;

/// Fallback solver for the builder's `integer_costs(false)` hint: selects
/// the classical cycle-canceling algorithm instead of the integer-only
/// cost-scaling core for non-integral inputs. Finds a feasible circulation,
/// then repeatedly finds and cancels a negative-cost cycle in its residual
/// network by Bellman-Ford until none remains. Unlike the cost-scaling
/// solver, this has no epsilon schedule and no potentials, it is the
/// classical algorithm, not the cost-scaling core this crate otherwise
/// implements. It shares this crate's `Ord`-bounded `Flow` (an actual `f64`
/// `Flow` is still out of scope); what it avoids is the cost-scaling
/// solver's integer-only reduced-cost scaling arithmetic.
#[derive(Default)]
pub struct CycleCanceling<Flow> {
    residual: ResidualGraph<Flow>,
}

impl<Flow> CycleCanceling<Flow>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy,
{
    pub fn solve(&mut self, graph: &mut Graph<Flow>) -> Status {
        if graph.is_unbalance() {
            return Status::Unbalanced;
        }
        if graph.num_nodes() == 0 {
            return Status::Optimal;
        }

        match circulation::solve_feasible_circulation(graph) {
            Status::Infeasible => return Status::Infeasible,
            Status::Unbalanced => return Status::Unbalanced,
            _ => {}
        }

        self.residual.build(graph);
        let n = self.residual.num_nodes;
        let mut predecessor = vec![(usize::MAX, usize::MAX); n];

        while let Some(on_cycle) = self.find_negative_cycle(&mut predecessor) {
            let mut delta: Option<Flow> = None;
            let mut v = on_cycle;
            loop {
                let (u, arc_id) = predecessor[v];
                let capacity = self.residual.arcs[arc_id].residual_capacity();
                delta = Some(delta.map_or(capacity, |d: Flow| d.min(capacity)));
                v = u;
                if v == on_cycle {
                    break;
                }
            }
            let delta = delta.expect("a negative cycle always has at least one arc");
            debug_assert!(delta > Flow::zero());

            let mut v = on_cycle;
            loop {
                let (u, arc_id) = predecessor[v];
                self.residual.push_flow(u, arc_id, delta);
                v = u;
                if v == on_cycle {
                    break;
                }
            }
        }

        self.residual.set_flow(graph);
        Status::Optimal
    }

    /// Bellman-Ford over residual arcs with positive capacity, relaxed for
    /// `|V|` rounds. A relaxation surviving into the final round means the
    /// arc just relaxed lies on (or feeds into) a negative cycle; walking
    /// `predecessor` links from there until a vertex repeats lands on a
    /// vertex that is actually on the cycle.
    fn find_negative_cycle(&self, predecessor: &mut [(usize, usize)]) -> Option<usize> {
        let n = self.residual.num_nodes;
        let mut distance = vec![Flow::zero(); n];
        let mut last_relaxed = usize::MAX;

        for _ in 0..n {
            let mut relaxed = false;
            for u in 0..n {
                for arc_id in self.residual.start[u]..self.residual.start[u + 1] {
                    let arc = &self.residual.arcs[arc_id];
                    if arc.residual_capacity() > Flow::zero() && distance[u] + arc.cost < distance[arc.to] {
                        distance[arc.to] = distance[u] + arc.cost;
                        predecessor[arc.to] = (u, arc_id);
                        last_relaxed = arc.to;
                        relaxed = true;
                    }
                }
            }
            if !relaxed {
                return None;
            }
        }

        let mut visited = vec![false; n];
        let mut v = last_relaxed;
        loop {
            if visited[v] {
                return Some(v);
            }
            visited[v] = true;
            v = predecessor[v].0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimum_cost_flow::graph::Graph;

    #[test]
    fn routes_through_the_cheaper_parallel_edge() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        let cheap = graph.add_directed_edge(0, 1, 0, 3, 1).unwrap();
        let expensive = graph.add_directed_edge(0, 1, 0, 3, 4).unwrap();
        graph.add_supply(0, 4);
        graph.add_demand(1, 4);

        let status = CycleCanceling::default().solve(&mut graph);
        assert_eq!(status, Status::Optimal);
        assert_eq!(graph.get_edge(cheap).unwrap().flow, 3);
        assert_eq!(graph.get_edge(expensive).unwrap().flow, 1);
        assert_eq!(graph.minimum_cost(), 7);
    }

    #[test]
    fn agrees_with_cost_scaling_on_the_diamond_instance() {
        use crate::minimum_cost_flow::cost_scaling_push_relabel::CostScalingPushRelabel;

        let build = || {
            let mut graph = Graph::<i64>::default();
            graph.add_nodes(4);
            graph.add_directed_edge(0, 1, 0, 2, 1).unwrap();
            graph.add_directed_edge(0, 2, 0, 2, 1).unwrap();
            graph.add_directed_edge(1, 3, 0, 2, 1).unwrap();
            graph.add_directed_edge(2, 3, 0, 2, 5).unwrap();
            graph.add_supply(0, 3);
            graph.add_demand(3, 3);
            graph
        };

        let mut by_cycle_canceling = build();
        let mut by_cost_scaling = build();
        assert_eq!(CycleCanceling::default().solve(&mut by_cycle_canceling), Status::Optimal);
        assert_eq!(CostScalingPushRelabel::default().solve(&mut by_cost_scaling), Status::Optimal);
        assert_eq!(by_cycle_canceling.minimum_cost(), by_cost_scaling.minimum_cost());
    }

    #[test]
    fn insufficient_capacity_is_infeasible() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        graph.add_directed_edge(0, 1, 0, 2, 1).unwrap();
        graph.add_supply(0, 5);
        graph.add_demand(1, 5);

        assert_eq!(CycleCanceling::default().solve(&mut graph), Status::Infeasible);
    }
}
