use crate::minimum_cost_flow::residual::ResidualGraph;
use num_traits::{FromPrimitive, NumAssign, ToPrimitive};
use std::ops::Neg;

/// Tries to prove the current flow is already eps-optimal by finding a
/// topological order of the admissible subgraph (residual arcs with
/// negative reduced cost). A back-edge in that search means the admissible
/// subgraph has a cycle, which a truly eps-optimal flow can never have, so the
/// cycle is canceled on the spot (it is flow-neutral, see `cancel_cycle`)
/// and the topological pass restarts from scratch.
///
/// Returns `true` when the flow is proven eps-optimal (nothing left for the
/// discharge loop to do this epsilon iteration); `false` when it made a
/// partial potential improvement but discharge is still required.
pub fn try_refine<Flow>(residual: &mut ResidualGraph<Flow>, epsilon: Flow, current_arc: &mut [usize]) -> bool
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + ToPrimitive + FromPrimitive,
{
    let n = residual.num_nodes;
    if n == 0 {
        return true;
    }

    let post_order = loop {
        match topological_pass(residual) {
            TopoResult::Order(order) => break order,
            TopoResult::CycleCanceled => continue,
        }
    };

    // Reverse of the DFS post-order (sinks finish first) is a source-first
    // topological order: every arc (u, v) in the admissible DAG has u
    // appearing before v, so rank[u] is final by the time an arc out of u is
    // examined.
    let mut rank = vec![0usize; n];
    for &u in post_order.iter().rev() {
        for arc_id in residual.start[u]..residual.start[u + 1] {
            let arc = &residual.arcs[arc_id];
            if arc.residual_capacity() <= Flow::zero() {
                continue;
            }
            let rc = residual.reduced_cost(u, arc);
            if rc < Flow::zero() {
                let k = biased_floor_k(rc, epsilon);
                let v = arc.to;
                rank[v] = rank[v].max(rank[u] + k);
            }
        }
    }

    let max_rank = rank.iter().copied().max().unwrap_or(0);
    if max_rank == 0 {
        return true;
    }

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for v in 0..n {
        buckets[rank[v]].push(v);
    }
    for r in (1..=max_rank).rev() {
        while let Some(u) = buckets[r].pop() {
            if rank[u] != r {
                continue;
            }
            for arc_id in residual.start[u]..residual.start[u + 1] {
                let arc = &residual.arcs[arc_id];
                if arc.residual_capacity() <= Flow::zero() {
                    continue;
                }
                let rc = residual.reduced_cost(u, arc);
                let k = biased_floor_k(rc, epsilon);
                let v = arc.to;
                let candidate = r + k;
                if candidate > rank[v] && candidate <= max_rank {
                    rank[v] = candidate;
                    buckets[candidate].push(v);
                }
            }
            residual.potentials[u] -= epsilon * Flow::from_usize(r).expect("rank must fit the Flow type");
            current_arc[u] = residual.start[u];
        }
    }

    false
}

/// `k = floor((-rc - 0.5) / eps)`, computed without a fractional type by
/// doubling numerator and denominator: `floor((-2rc - 1) / (2eps))`.
fn biased_floor_k<Flow>(rc: Flow, epsilon: Flow) -> usize
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + ToPrimitive,
{
    let rc_i64 = rc.to_i64().expect("reduced cost must fit in i64 for rank arithmetic");
    let eps_i64 = epsilon.to_i64().expect("epsilon must fit in i64 for rank arithmetic");
    let k = (-2 * rc_i64 - 1).div_euclid(2 * eps_i64);
    k.max(0) as usize
}

enum TopoResult {
    Order(Vec<usize>),
    CycleCanceled,
}

/// One attempt at a topological order of the admissible subgraph via
/// iterative (explicit-stack) DFS, matching the current-arc-cursor idiom
/// used throughout the rest of this crate rather than recursion, since a
/// plain recursive DFS cannot represent the cycle-found-mid-descent restart
/// cleanly. `scan_cursor` is local to this pass; it never touches the
/// discharge loop's `current_arc`.
fn topological_pass<Flow>(residual: &mut ResidualGraph<Flow>) -> TopoResult
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy,
{
    #[derive(Clone, Copy, PartialEq)]
    enum Visit {
        Unvisited,
        OnStack,
        Finished,
    }

    let n = residual.num_nodes;
    let mut visit = vec![Visit::Unvisited; n];
    let mut scan_cursor: Vec<usize> = (0..n).map(|v| residual.start[v]).collect();
    let mut post_order = Vec::with_capacity(n);

    let mut stack: Vec<usize> = Vec::new();
    let mut descend_arc: Vec<usize> = Vec::new();

    for root in 0..n {
        if visit[root] != Visit::Unvisited {
            continue;
        }
        stack.push(root);
        visit[root] = Visit::OnStack;

        while let Some(&u) = stack.last() {
            let mut advanced = None;
            while scan_cursor[u] < residual.start[u + 1] {
                let arc_id = scan_cursor[u];
                let arc = &residual.arcs[arc_id];
                if arc.residual_capacity() > Flow::zero() && residual.reduced_cost(u, arc) < Flow::zero() {
                    advanced = Some((arc_id, arc.to));
                    break;
                }
                scan_cursor[u] += 1;
            }

            match advanced {
                Some((arc_id, v)) => match visit[v] {
                    Visit::Unvisited => {
                        scan_cursor[u] += 1;
                        descend_arc.push(arc_id);
                        stack.push(v);
                        visit[v] = Visit::OnStack;
                    }
                    Visit::OnStack => {
                        let cycle_start = stack.iter().position(|&x| x == v).expect("back-edge target must be on the stack");
                        let mut cycle_arcs: Vec<usize> = descend_arc[cycle_start..].to_vec();
                        cycle_arcs.push(arc_id);
                        cancel_cycle(residual, &cycle_arcs);
                        return TopoResult::CycleCanceled;
                    }
                    Visit::Finished => {
                        scan_cursor[u] += 1;
                    }
                },
                None => {
                    visit[u] = Visit::Finished;
                    post_order.push(u);
                    stack.pop();
                    descend_arc.pop();
                }
            }
        }
    }

    TopoResult::Order(post_order)
}

/// Cancels a cycle of admissible arcs: pushes flow equal to the bottleneck
/// residual capacity along every arc in the cycle. Net excess change is zero
/// for every vertex on the cycle (each appears once as an arc's source and
/// once as another arc's target), so this changes the residual graph without
/// touching feasibility.
fn cancel_cycle<Flow>(residual: &mut ResidualGraph<Flow>, cycle_arcs: &[usize])
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy,
{
    let mut delta = cycle_arcs.iter().map(|&arc_id| residual.arcs[arc_id].residual_capacity()).fold(None, |acc: Option<Flow>, cap| Some(acc.map_or(cap, |a| a.min(cap))));
    let delta = delta.take().expect("cycle must contain at least one arc");

    let mut u = residual.arcs[*cycle_arcs.last().unwrap()].to;
    for &arc_id in cycle_arcs {
        residual.push_flow(u, arc_id, delta);
        u = residual.arcs[arc_id].to;
    }
}
