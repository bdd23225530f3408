use crate::minimum_cost_flow::graph::Graph;
use num_traits::NumAssign;
use std::ops::Neg;

/// One arc of the residual network: either the forward copy of an original
/// edge (`is_original == true`) or its paired reverse arc. `twin` always
/// points at the other half of the pair; `cost[e] == -cost[twin[e]]` and
/// `residual_capacity(e) + residual_capacity(twin[e]) == capacity(original
/// edge of the pair)` hold for the lifetime of the residual graph.
#[derive(Default, Debug)]
pub struct Arc<Flow> {
    pub to: usize,
    pub flow: Flow,
    pub upper: Flow,
    pub cost: Flow,
    pub twin: usize,
    pub is_original: bool,
}

#[allow(dead_code)]
impl<Flow> Arc<Flow>
where
    Flow: NumAssign + Ord + Copy,
{
    #[inline]
    pub fn residual_capacity(&self) -> Flow {
        self.upper - self.flow
    }
}

/// The residual network. A flat arc array with an explicit `twin` index
/// per arc (no owning pointers), dense `start` offsets per vertex (CSR
/// layout), and the per-vertex potential/excess state the cost-scaling
/// solver mutates in place.
#[derive(Default)]
pub struct ResidualGraph<Flow> {
    pub num_nodes: usize,
    pub num_edges: usize,
    edge_to_arc: Vec<usize>,

    pub excesses: Vec<Flow>,
    pub potentials: Vec<Flow>,

    pub start: Vec<usize>,
    pub arcs: Vec<Arc<Flow>>,
}

#[allow(dead_code)]
impl<Flow> ResidualGraph<Flow>
where
    Flow: NumAssign + Neg<Output = Flow> + Ord + Copy,
{
    pub fn build(&mut self, graph: &Graph<Flow>) {
        if graph.num_nodes() == 0 {
            return;
        }

        self.num_nodes = graph.num_nodes();
        self.num_edges = graph.num_edges();

        // `graph.excesses` is the supply/demand assuming every edge carries
        // zero flow; if `graph` already carries a flow (e.g. a feasible
        // circulation computed earlier), subtract its net effect so the
        // residual excess reflects the *remaining* imbalance, which is zero
        // once a feasible circulation is already in place.
        self.excesses = graph.excesses.clone();
        for edge in graph.edges.iter() {
            self.excesses[edge.from] -= edge.flow;
            self.excesses[edge.to] += edge.flow;
        }

        self.edge_to_arc.resize(self.num_edges, usize::MAX);
        self.start.resize(self.num_nodes + 1, 0);
        self.arcs = (0..2 * self.num_edges).map(|_| Arc { to: 0, flow: Flow::zero(), upper: Flow::zero(), cost: Flow::zero(), twin: 0, is_original: false }).collect();
        self.potentials.resize(self.num_nodes, Flow::zero());

        let mut degree = vec![0usize; self.num_nodes];
        for edge in graph.edges.iter() {
            degree[edge.to] += 1;
            degree[edge.from] += 1;
        }

        for i in 1..=self.num_nodes {
            self.start[i] += self.start[i - 1] + degree[i - 1];
        }

        let mut counter = vec![0usize; self.num_nodes];
        for (edge_index, edge) in graph.edges.iter().enumerate() {
            let (u, v) = (edge.from, edge.to);
            let forward = self.start[u] + counter[u];
            counter[u] += 1;
            let backward = self.start[v] + counter[v];
            counter[v] += 1;

            assert_ne!(forward, backward);
            assert!(edge.cost >= Flow::zero());
            assert!(edge.upper >= Flow::zero());

            self.edge_to_arc[edge_index] = forward;
            self.arcs[forward] = Arc { to: v, flow: edge.flow, upper: edge.upper, cost: edge.cost, twin: backward, is_original: true };
            self.arcs[backward] = Arc { to: u, flow: edge.upper - edge.flow, upper: edge.upper, cost: -edge.cost, twin: forward, is_original: false };
        }
    }

    pub fn set_flow(&self, graph: &mut Graph<Flow>) {
        graph.excesses = self.excesses.clone();
        for edge_id in 0..graph.num_edges() {
            let arc = self.edge_to_arc[edge_id];
            graph.edges[edge_id].flow = self.arcs[arc].flow;
        }
    }

    #[inline]
    pub fn neighbors(&self, u: usize) -> std::slice::Iter<Arc<Flow>> {
        self.arcs[self.start[u]..self.start[u + 1]].iter()
    }

    #[inline]
    pub fn push_flow(&mut self, u: usize, arc_id: usize, flow: Flow) {
        let twin = self.arcs[arc_id].twin;
        let to = self.arcs[arc_id].to;
        self.arcs[arc_id].flow += flow;
        self.arcs[twin].flow -= flow;
        self.excesses[u] -= flow;
        self.excesses[to] += flow;
    }

    /// `cost(e) + pi(source(e)) - pi(target(e))`.
    #[inline]
    pub fn reduced_cost(&self, u: usize, arc: &Arc<Flow>) -> Flow {
        arc.cost + self.potentials[u] - self.potentials[arc.to]
    }

    #[inline]
    pub fn is_admissible(&self, u: usize, arc: &Arc<Flow>) -> bool {
        arc.residual_capacity() > Flow::zero() && self.reduced_cost(u, arc) < Flow::zero()
    }
}

/// Integer floor division (`numerator` may be negative, `denominator` is
/// always positive here). Rust's `/` truncates toward zero; the global
/// update and potential refinement rank arithmetic needs the mathematical
/// floor, so correct the truncated quotient down by one whenever truncation
/// rounded toward zero instead of down.
#[inline]
pub(crate) fn floor_div<Flow>(numerator: Flow, denominator: Flow) -> Flow
where
    Flow: NumAssign + Ord + Copy,
{
    let quotient = numerator / denominator;
    let remainder = numerator - quotient * denominator;
    if remainder != Flow::zero() && (remainder < Flow::zero()) != (denominator < Flow::zero()) {
        quotient - Flow::one()
    } else {
        quotient
    }
}
