use crate::model::costing::CostingError;
use crate::model::network::{GraphId, NetworkError};

#[derive(thiserror::Error, Debug)]
pub enum MatrixError {
    #[error("failure building matrix query: {0}")]
    BuildError(String),
    #[error("matrix query failed due to a road network error: {source}")]
    NetworkFailure {
        #[from]
        source: NetworkError,
    },
    #[error("matrix query failed due to a costing error: {source}")]
    CostingFailure {
        #[from]
        source: CostingError,
    },
    #[error("costing produced an invalid cost for edge {0}")]
    InvalidCost(GraphId),
    #[error("edge label count {count} exceeds the hard cap of {cap}")]
    ResourceExhaustion { count: usize, cap: usize },
    #[error("internal error due to matrix search logic: {0}")]
    InternalError(String),
}
