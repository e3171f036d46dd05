mod costing_error;
mod costing_table;
pub mod default;
mod dynamic_cost;
mod hierarchy_limits;
mod mode;

pub use costing_error::CostingError;
pub use costing_table::CostingTable;
pub use dynamic_cost::DynamicCost;
pub use hierarchy_limits::HierarchyLimits;
pub use mode::{TravelMode, ALL_ACCESS, AUTO_ACCESS, BICYCLE_ACCESS, PEDESTRIAN_ACCESS};
