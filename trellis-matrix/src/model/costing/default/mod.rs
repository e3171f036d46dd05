mod free_flow;

pub use free_flow::FreeFlowCost;
