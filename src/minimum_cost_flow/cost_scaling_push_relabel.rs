use crate::minimum_cost_flow::circulation;
use crate::minimum_cost_flow::global_update;
use crate::minimum_cost_flow::graph::Graph;
use crate::minimum_cost_flow::potential_refinement;
use crate::minimum_cost_flow::residual::ResidualGraph;
use crate::minimum_cost_flow::status::Status;
use num_traits::{FromPrimitive, NumAssign, ToPrimitive};
use std::collections::VecDeque;
use std::ops::Neg;

/// Bound on partial-augmentation path length: a discharge DFS pushes
/// flow (or relabels and backs up) the moment the in-progress path reaches
/// this many arcs, rather than searching all the way to a deficit vertex.
const MAX_AUGMENT_PATH_LENGTH: usize = 4;

/// The cost-scaling outer loop. Owns the residual network and every piece
/// of transient state the epsilon schedule threads through discharge,
/// global update and potential refinement: the current-arc cursor, the
/// active-vertex FIFO, and the in-progress augmentation path with its
/// on-path membership set.
pub struct CostScalingPushRelabel<Flow> {
    residual: ResidualGraph<Flow>,
    current_arc: Vec<usize>,
    active_queue: VecDeque<usize>,
    path: Vec<usize>,
    on_path: Vec<bool>,
    alpha: Flow,
}

impl<Flow> Default for CostScalingPushRelabel<Flow>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + FromPrimitive + Default,
{
    fn default() -> Self {
        Self {
            residual: ResidualGraph::default(),
            current_arc: Vec::new(),
            active_queue: VecDeque::new(),
            path: Vec::new(),
            on_path: Vec::new(),
            alpha: Flow::from_isize(16).unwrap(),
        }
    }
}

impl<Flow> CostScalingPushRelabel<Flow>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + FromPrimitive + ToPrimitive + Default,
{
    /// `scaling_factor` is usually between 8 and 24; the default is 16.
    pub fn new(scaling_factor: Flow) -> Self {
        assert!(scaling_factor > Flow::one());
        Self {
            residual: ResidualGraph::default(),
            current_arc: Vec::new(),
            active_queue: VecDeque::new(),
            path: Vec::new(),
            on_path: Vec::new(),
            alpha: scaling_factor,
        }
    }

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

        self.current_arc.clear();
        self.current_arc.extend_from_slice(&self.residual.start[..n]);
        self.on_path.clear();
        self.on_path.resize(n, false);
        self.path.clear();
        self.active_queue.clear();

        let n_flow = Flow::from_usize(n).expect("vertex count must fit the Flow type");
        let cost_scaling_factor = self.alpha * n_flow;

        // every edge cost is already non-negative (Graph::add_directed_edge
        // folds negative-cost edges into their reverse), so the maximum over
        // every residual arc is exactly the maximum over original edges.
        let max_cost = self.residual.arcs.iter().map(|arc| arc.cost).max().unwrap_or(Flow::zero());

        for arc in self.residual.arcs.iter_mut() {
            arc.cost *= cost_scaling_factor;
        }
        let scaled_max_cost = max_cost * cost_scaling_factor;
        let mut epsilon = Flow::one().max(scaled_max_cost / self.alpha);

        let rank_upper_bound = self.alpha.to_usize().expect("alpha must fit usize for the bucket queue") * n;

        let mut eps_iter = 0usize;
        let mut relabels_since_update = 0usize;

        loop {
            let refined = if eps_iter >= 2 { potential_refinement::try_refine(&mut self.residual, epsilon, &mut self.current_arc) } else { false };

            if !refined {
                Self::saturate_admissible(&mut self.residual);

                self.active_queue.clear();
                for v in 0..n {
                    if self.residual.excesses[v] > Flow::zero() {
                        self.active_queue.push_back(v);
                    }
                }

                while let Some(u) = self.active_queue.pop_front() {
                    if self.residual.excesses[u] <= Flow::zero() {
                        continue;
                    }

                    relabels_since_update += self.discharge(u, epsilon);

                    if self.residual.excesses[u] > Flow::zero() {
                        self.active_queue.push_back(u);
                    }

                    if relabels_since_update >= n {
                        global_update::run(&mut self.residual, epsilon, &mut self.current_arc, rank_upper_bound);
                        relabels_since_update = 0;
                    }
                }
            }

            if epsilon == Flow::one() {
                break;
            }
            epsilon = (epsilon / self.alpha).max(Flow::one());
            eps_iter += 1;
        }

        debug_assert!(
            (0..n).all(|u| (self.residual.start[u]..self.residual.start[u + 1])
                .all(|arc_id| { let arc = &self.residual.arcs[arc_id]; arc.residual_capacity() <= Flow::zero() || self.residual.reduced_cost(u, arc) >= Flow::zero() })),
            "final flow is not optimal: a residual arc with negative reduced cost remains"
        );

        for pi in self.residual.potentials.iter_mut() {
            *pi /= cost_scaling_factor;
        }
        let max_potential = self.residual.potentials.iter().copied().max().unwrap_or(Flow::zero());
        if max_potential > Flow::zero() {
            for pi in self.residual.potentials.iter_mut() {
                *pi -= max_potential;
            }
        }
        for arc in self.residual.arcs.iter_mut() {
            arc.cost /= cost_scaling_factor;
        }

        self.residual.set_flow(graph);

        Status::Optimal
    }

    /// Turns the current (generally infeasible w.r.t. eps-optimality) flow
    /// into a 0-excess-preserving pseudoflow that is eps-optimal at every
    /// residual arc: saturate arcs whose reduced cost is negative, and empty
    /// arcs whose reduced cost has become positive since the last phase (a
    /// potential change can turn a previously-saturated arc non-optimal).
    /// Whatever local imbalance this creates is exactly the excess the
    /// active-vertex loop below resolves.
    fn saturate_admissible(residual: &mut ResidualGraph<Flow>) {
        for u in 0..residual.num_nodes {
            for arc_id in residual.start[u]..residual.start[u + 1] {
                let (rc, capacity, flow) = {
                    let arc = &residual.arcs[arc_id];
                    (residual.reduced_cost(u, arc), arc.residual_capacity(), arc.flow)
                };
                if rc < Flow::zero() && capacity > Flow::zero() {
                    residual.push_flow(u, arc_id, capacity);
                } else if rc > Flow::zero() && flow > Flow::zero() {
                    residual.push_flow(u, arc_id, -flow);
                }
            }
        }
    }

    /// Discharges `start` by one partial-augment unit: a bounded DFS
    /// over admissible arcs that ends in exactly one flow push, or in a
    /// relabel of `start` itself once the DFS has backed all the way out.
    /// Returns the number of relabels performed so the caller can drive the
    /// global-update cadence (every `|V|` relabels).
    fn discharge(&mut self, start: usize, epsilon: Flow) -> usize {
        let mut relabels = 0usize;
        self.path.clear();
        self.on_path[start] = true;
        let mut u = start;

        loop {
            let end = self.residual.start[u + 1];
            let mut found = None;
            while self.current_arc[u] < end {
                let arc_id = self.current_arc[u];
                let arc = &self.residual.arcs[arc_id];
                if self.residual.is_admissible(u, arc) {
                    found = Some((arc_id, arc.to));
                    break;
                }
                self.current_arc[u] += 1;
            }

            match found {
                Some((arc_id, v)) => {
                    let closing_cycle = self.on_path[v];
                    self.path.push(arc_id);
                    self.on_path[v] = true;
                    let reached_deficit = self.residual.excesses[v] < Flow::zero();
                    let reached_max_length = self.path.len() == MAX_AUGMENT_PATH_LENGTH;
                    u = v;

                    if reached_max_length || reached_deficit || closing_cycle {
                        self.push_flow_along_path(start);
                        return relabels;
                    }
                }
                None => {
                    self.relabel(u, epsilon);
                    relabels += 1;

                    if u != start {
                        let popped = self.path.pop().expect("backing up out of a non-source vertex requires a non-empty path");
                        self.on_path[u] = false;
                        let twin = self.residual.arcs[popped].twin;
                        u = self.residual.arcs[twin].to;
                    } else {
                        self.on_path[start] = false;
                        return relabels;
                    }
                }
            }
        }
    }

    /// Relabels `u`, which has no admissible residual out-arc: lower its
    /// potential by the smallest amount that makes at least one residual
    /// out-arc admissible, plus `epsilon` of slack. When `u` was reached via
    /// an arc still on `path`, that arc's reverse is folded into the minimum
    /// even if it currently carries no residual capacity, so the arc we just
    /// arrived on stays admissible and the DFS can still back out over it.
    fn relabel(&mut self, u: usize, epsilon: Flow) {
        let incoming_twin = self.path.last().map(|&arc_id| self.residual.arcs[arc_id].twin);

        let mut delta: Option<Flow> = None;
        for arc_id in self.residual.start[u]..self.residual.start[u + 1] {
            let arc = &self.residual.arcs[arc_id];
            if arc.residual_capacity() <= Flow::zero() {
                continue;
            }
            let rc = self.residual.reduced_cost(u, arc);
            delta = Some(delta.map_or(rc, |d| d.min(rc)));
        }
        if let Some(twin_id) = incoming_twin {
            let rc = self.residual.reduced_cost(u, &self.residual.arcs[twin_id]);
            delta = Some(delta.map_or(rc, |d| d.min(rc)));
        }

        let delta = delta.expect("relabel found no finite minimum reduced cost: vertex has no residual out-arc");
        self.residual.potentials[u] -= delta + epsilon;
        self.current_arc[u] = self.residual.start[u];
    }

    /// Pushes `delta = min(residual capacity along path, excess[start])`
    /// along every arc of the in-progress path, in order, enqueuing any
    /// vertex that was not already active and just became so.
    fn push_flow_along_path(&mut self, start: usize) {
        let mut delta = self.residual.excesses[start];
        for &arc_id in self.path.iter() {
            delta = delta.min(self.residual.arcs[arc_id].residual_capacity());
        }

        for &arc_id in self.path.iter() {
            let twin = self.residual.arcs[arc_id].twin;
            let u = self.residual.arcs[twin].to;
            let to = self.residual.arcs[arc_id].to;
            self.residual.push_flow(u, arc_id, delta);
            if self.residual.excesses[to] > Flow::zero() && self.residual.excesses[to] <= delta {
                self.active_queue.push_back(to);
            }
        }

        self.on_path[start] = false;
        for &arc_id in self.path.iter() {
            self.on_path[self.residual.arcs[arc_id].to] = false;
        }
        self.path.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimum_cost_flow::graph::Graph;
    use rstest::rstest;

    #[rstest]
    // 1. single arc.
    #[case(2, &[(0, 1, 0, 5, 2)], &[(0, 5), (1, -5)], &[5], 10)]
    // 2. parallel cheap/expensive.
    #[case(2, &[(0, 1, 0, 3, 1), (0, 1, 0, 3, 4)], &[(0, 4), (1, -4)], &[3, 1], 7)]
    // 3. diamond.
    #[case(4, &[(0, 1, 0, 2, 1), (0, 2, 0, 2, 1), (1, 3, 0, 2, 1), (2, 3, 0, 2, 5)], &[(0, 3), (3, -3)], &[2, 1, 2, 1], 10)]
    // 4. lower-bound forced edge.
    #[case(3, &[(0, 1, 2, 5, 10), (0, 2, 0, 5, 1), (1, 2, 0, 5, 1)], &[(0, 3), (2, -3)], &[2, 1, 2], 23)]
    fn boundary_scenarios_match_expected_flow_and_cost(
        #[case] num_nodes: usize,
        #[case] edges: &[(usize, usize, i64, i64, i64)],
        #[case] supplies: &[(usize, i64)],
        #[case] expected_flow: &[i64],
        #[case] expected_cost: i64,
    ) {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(num_nodes);
        let edge_ids: Vec<usize> = edges.iter().map(|&(from, to, lower, upper, cost)| graph.add_directed_edge(from, to, lower, upper, cost).unwrap()).collect();
        for &(node, supply) in supplies {
            if supply > 0 {
                graph.add_supply(node, supply);
            } else {
                graph.add_demand(node, -supply);
            }
        }

        let status = CostScalingPushRelabel::default().solve(&mut graph);
        assert_eq!(status, Status::Optimal);

        for (&edge_id, &flow) in edge_ids.iter().zip(expected_flow.iter()) {
            assert_eq!(graph.get_edge(edge_id).unwrap().flow, flow);
        }
        assert_eq!(graph.minimum_cost(), expected_cost);
    }

    #[test]
    fn negative_cost_self_edge_is_saturated() {
        // 5. negative-cost cycle eligible self-edge.
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        let self_loop = graph.add_directed_edge(0, 0, 0, 3, -2).unwrap();
        let to_sink = graph.add_directed_edge(0, 1, 0, 1, 0).unwrap();
        graph.add_supply(0, 1);
        graph.add_demand(1, 1);

        let status = CostScalingPushRelabel::default().solve(&mut graph);
        assert_eq!(status, Status::Optimal);

        assert_eq!(graph.get_edge(self_loop).unwrap().flow, 3);
        assert_eq!(graph.get_edge(to_sink).unwrap().flow, 1);
        assert_eq!(graph.minimum_cost(), -6);
    }

    #[test]
    fn non_negative_cost_self_edge_carries_no_flow() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        let self_loop = graph.add_directed_edge(0, 0, 0, 3, 2).unwrap();
        let to_sink = graph.add_directed_edge(0, 1, 0, 1, 0).unwrap();
        graph.add_supply(0, 1);
        graph.add_demand(1, 1);

        let status = CostScalingPushRelabel::default().solve(&mut graph);
        assert_eq!(status, Status::Optimal);
        assert_eq!(graph.get_edge(self_loop).unwrap().flow, 0);
        assert_eq!(graph.get_edge(to_sink).unwrap().flow, 1);
    }

    #[test]
    fn unbalanced_supply_is_rejected() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        graph.add_directed_edge(0, 1, 0, 5, 1).unwrap();
        graph.add_supply(0, 5);
        graph.add_demand(1, 3);

        assert_eq!(CostScalingPushRelabel::default().solve(&mut graph), Status::Unbalanced);
    }

    #[test]
    fn insufficient_capacity_is_infeasible() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(2);
        graph.add_directed_edge(0, 1, 0, 2, 1).unwrap();
        graph.add_supply(0, 5);
        graph.add_demand(1, 5);

        assert_eq!(CostScalingPushRelabel::default().solve(&mut graph), Status::Infeasible);
    }

    #[test]
    fn idempotent_across_fresh_solver_instances() {
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

        let mut first = build();
        let mut second = build();
        assert_eq!(CostScalingPushRelabel::default().solve(&mut first), Status::Optimal);
        assert_eq!(CostScalingPushRelabel::default().solve(&mut second), Status::Optimal);
        assert_eq!(first.minimum_cost(), second.minimum_cost());
        for edge_id in 0..first.num_edges() {
            assert_eq!(first.get_edge(edge_id).unwrap().flow, second.get_edge(edge_id).unwrap().flow);
        }
    }

    #[test]
    fn zero_supply_graph_is_trivially_optimal() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(3);
        graph.add_directed_edge(0, 1, 0, 5, 2).unwrap();
        graph.add_directed_edge(1, 2, 0, 5, 3).unwrap();

        assert_eq!(CostScalingPushRelabel::default().solve(&mut graph), Status::Optimal);
        assert_eq!(graph.minimum_cost(), 0);
    }
}
