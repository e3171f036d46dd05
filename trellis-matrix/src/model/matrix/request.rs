use super::MatrixLocation;
use crate::model::costing::TravelMode;
use serde::{Deserialize, Serialize};

/// a many-to-many cost matrix query
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatrixRequest {
    pub sources: Vec<MatrixLocation>,
    pub targets: Vec<MatrixLocation>,
    pub mode: TravelMode,
    /// meters; pairs farther apart than this are reported not found
    pub max_matrix_distance: f64,
    /// when set, costing sees a time-of-day snapshot and found paths are
    /// recosted with real timestamps afterwards
    #[serde(default)]
    pub has_time: bool,
    /// hold time constant along the path; skips recosting
    #[serde(default)]
    pub invariant: bool,
}

impl MatrixRequest {
    pub fn new(
        sources: Vec<MatrixLocation>,
        targets: Vec<MatrixLocation>,
        mode: TravelMode,
        max_matrix_distance: f64,
    ) -> MatrixRequest {
        MatrixRequest {
            sources,
            targets,
            mode,
            max_matrix_distance,
            has_time: false,
            invariant: false,
        }
    }
}
