use num_traits::NumAssign;
use std::fmt::Debug;
use std::ops::Neg;

#[derive(PartialEq, Debug, Clone)]
pub struct Edge<Flow> {
    pub from: usize,
    pub to: usize,
    pub flow: Flow,
    pub lower: Flow,
    pub upper: Flow,
    pub cost: Flow,
}

/// Dense-index directed multigraph with integer capacities, costs, and
/// per-vertex supply/demand. Negative-cost edges and edges with a positive
/// lower bound are folded in at insertion time (see `add_directed_edge`) so
/// that every downstream solver only ever sees non-negative costs and a
/// lower bound of zero.
#[derive(Default)]
pub struct Graph<Flow> {
    num_nodes: usize,
    num_edges: usize,
    pub(crate) edges: Vec<Edge<Flow>>,
    pub(crate) b: Vec<Flow>,
    pub(crate) lowers: Vec<Flow>,
    pub(crate) excesses: Vec<Flow>,
    pub(crate) is_reversed: Vec<bool>,
}

impl<Flow> Graph<Flow>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy,
{
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn add_node(&mut self) -> usize {
        self.b.push(Flow::zero());
        self.excesses.push(Flow::zero());
        self.num_nodes += 1;
        self.num_nodes - 1
    }

    pub fn add_nodes(&mut self, num_nodes: usize) -> Vec<usize> {
        self.b.extend(vec![Flow::zero(); num_nodes]);
        self.excesses.extend(vec![Flow::zero(); num_nodes]);
        self.num_nodes += num_nodes;
        ((self.num_nodes - num_nodes)..self.num_nodes).collect()
    }

    pub fn add_supply(&mut self, u: usize, supply: Flow) {
        self.b[u] += supply;
        self.excesses[u] += supply;
    }

    pub fn add_demand(&mut self, u: usize, demand: Flow) {
        self.b[u] -= demand;
        self.excesses[u] -= demand;
    }

    /// Adds a directed edge `from -> to` with `lower <= flow <= upper` and the
    /// given (possibly negative) integer cost. Returns `None` (an
    /// `INVALID_ARGUMENT`-class failure) when `lower > upper` or either
    /// endpoint is out of range.
    ///
    /// Internally: a positive lower bound is subtracted out of the edge's
    /// capacity and folded into the endpoints' supply/demand (the lower
    /// bound is added back by `get_edge`); a negative cost edge is stored as
    /// its reverse with a positive cost and its capacity pre-saturated onto
    /// the endpoints, so every solver downstream of this graph only ever
    /// sees non-negative residual costs. A self-loop with negative cost goes
    /// through the same path and falls out already fully saturated by
    /// construction, with no separate post-processing step required.
    pub fn add_directed_edge(&mut self, from: usize, to: usize, lower: Flow, upper: Flow, cost: Flow) -> Option<usize> {
        if lower > upper || from >= self.num_nodes || to >= self.num_nodes {
            return None;
        }

        if cost >= Flow::zero() {
            self.edges.push(Edge { from, to, flow: Flow::zero(), lower: Flow::zero(), upper: upper - lower, cost });
            self.excesses[from] -= lower;
            self.excesses[to] += lower;
            self.lowers.push(lower);
            self.is_reversed.push(false);
        } else {
            self.edges.push(Edge { from: to, to: from, flow: Flow::zero(), lower: Flow::zero(), upper: upper - lower, cost: -cost });
            self.excesses[from] -= upper;
            self.excesses[to] += upper;
            self.lowers.push(lower);
            self.is_reversed.push(true);
        }

        self.num_edges += 1;
        Some(self.num_edges - 1)
    }

    pub fn get_edge(&self, edge_id: usize) -> Option<Edge<Flow>> {
        if edge_id >= self.edges.len() {
            return None;
        }
        let edge = &self.edges[edge_id];
        let lower = self.lowers[edge_id];
        if self.is_reversed[edge_id] {
            Some(Edge { from: edge.to, to: edge.from, flow: edge.upper - edge.flow + lower, lower, upper: edge.upper + lower, cost: -edge.cost })
        } else {
            Some(Edge { from: edge.from, to: edge.to, flow: edge.flow + lower, lower, upper: edge.upper + lower, cost: edge.cost })
        }
    }

    pub fn minimum_cost(&self) -> Flow {
        (0..self.num_edges).fold(Flow::zero(), |cost, edge_id| {
            let edge = self.get_edge(edge_id).unwrap();
            cost + edge.cost * edge.flow
        })
    }

    pub fn is_unbalance(&self) -> bool {
        self.b.iter().fold(Flow::zero(), |sum, &excess| sum + excess) != Flow::zero()
    }
}
