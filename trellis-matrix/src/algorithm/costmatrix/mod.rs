mod best_candidate;
mod cost_matrix;
mod edge_label;
mod edge_status;
mod matrix_error;
mod recost;
mod search_state;
mod target_map;

pub use best_candidate::BestCandidate;
pub use cost_matrix::CostMatrix;
pub use edge_label::{EdgeLabel, INVALID_LABEL};
pub use edge_status::{EdgeSet, EdgeStatus, EdgeStatusInfo};
pub use matrix_error::MatrixError;
pub use target_map::{TargetMap, TargetReach};
