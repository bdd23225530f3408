use crate::minimum_cost_flow::residual::ResidualGraph;
use num_traits::{FromPrimitive, NumAssign, ToPrimitive};
use std::collections::VecDeque;
use std::ops::Neg;

/// Recomputes every vertex's potential by a reverse shortest-path-by-rank
/// scan over admissible residual arcs, starting simultaneously from every
/// deficit vertex. Tightens potentials network-wide far faster than waiting
/// for relabels to propagate one hop at a time.
///
/// `rank_upper_bound` is `alpha * |V|` (the caller's scaling factor times
/// vertex count); the bucketed queue is sized to match. Resets
/// `current_arc[v]` for every vertex whose potential actually moved, exactly
/// as a direct relabel of `v` would.
pub fn run<Flow>(residual: &mut ResidualGraph<Flow>, epsilon: Flow, current_arc: &mut [usize], rank_upper_bound: usize)
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy + ToPrimitive + FromPrimitive,
{
    let n = residual.num_nodes;
    if n == 0 {
        return;
    }
    let eps_i64 = epsilon.to_i64().expect("epsilon must fit in i64 for rank arithmetic");

    let mut rank = vec![rank_upper_bound; n];
    let mut buckets: Vec<VecDeque<usize>> = (0..=rank_upper_bound).map(|_| VecDeque::new()).collect();

    let mut excess_sum = Flow::zero();
    for v in 0..n {
        if residual.excesses[v] < Flow::zero() {
            rank[v] = 0;
            buckets[0].push_back(v);
        }
        if residual.excesses[v] > Flow::zero() {
            excess_sum += residual.excesses[v];
        }
    }
    if excess_sum <= Flow::zero() {
        return;
    }

    let mut last_rank_drained = 0usize;
    'drain: for r in 0..=rank_upper_bound {
        last_rank_drained = r;
        while let Some(u) = buckets[r].pop_front() {
            if rank[u] != r {
                // stale: u was relinked to a lower bucket after being queued here
                continue;
            }

            for arc_id in residual.start[u]..residual.start[u + 1] {
                let v = residual.arcs[arc_id].to;
                let twin_id = residual.arcs[arc_id].twin;
                if residual.arcs[twin_id].residual_capacity() <= Flow::zero() {
                    continue;
                }
                if rank[v] <= r {
                    continue;
                }

                // residual arc from v to u is `twin`; its reduced cost from v's side.
                let rc = residual.reduced_cost(v, &residual.arcs[twin_id]);
                let rc_i64 = rc.to_i64().expect("reduced cost must fit in i64 for rank arithmetic");
                let nrc = rc_i64.div_euclid(eps_i64);
                if nrc >= rank_upper_bound as i64 {
                    continue;
                }
                let candidate = (r as i64 + 1 + nrc).max(0) as usize;
                if candidate < rank[v] {
                    rank[v] = candidate;
                    buckets[candidate].push_back(v);
                    current_arc[v] = residual.start[v];
                }
            }

            if residual.excesses[u] > Flow::zero() {
                excess_sum -= residual.excesses[u];
            }
            if excess_sum <= Flow::zero() {
                break 'drain;
            }
        }
    }

    for v in 0..n {
        let capped = rank[v].min(last_rank_drained);
        if capped > 0 {
            let adjustment = epsilon * Flow::from_usize(capped).expect("rank must fit the Flow type");
            residual.potentials[v] -= adjustment;
            current_arc[v] = residual.start[v];
        }
    }
}
