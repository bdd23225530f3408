pub mod maximum_flow;
pub mod minimum_cost_flow;
