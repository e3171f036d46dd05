use crate::model::network::GraphId;
use serde::{Deserialize, Serialize};

/// a directed edge a location was matched onto, with the fraction of the
/// edge already behind a traveler standing at the location
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct CandidateEdge {
    pub edge_id: GraphId,
    /// position along the edge in [0, 1]
    #[serde(default)]
    pub percent_along: f64,
}

impl CandidateEdge {
    pub fn new(edge_id: GraphId, percent_along: f64) -> CandidateEdge {
        CandidateEdge {
            edge_id,
            percent_along: percent_along.clamp(0.0, 1.0),
        }
    }
}

/// one source or target of a matrix query: the candidate edges the
/// location snapped to, and an optional local departure (source) or
/// arrival (target) time
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatrixLocation {
    pub edges: Vec<CandidateEdge>,
    #[serde(default)]
    pub date_time: Option<String>,
}

impl MatrixLocation {
    pub fn new(edges: Vec<CandidateEdge>) -> MatrixLocation {
        MatrixLocation {
            edges,
            date_time: None,
        }
    }

    pub fn with_date_time(edges: Vec<CandidateEdge>, date_time: &str) -> MatrixLocation {
        MatrixLocation {
            edges,
            date_time: Some(date_time.to_string()),
        }
    }

    /// the percent along the given edge, if it is one of this location's
    /// candidates. used when recosting partial first and last edges.
    pub fn percent_along(&self, edge_id: &GraphId) -> Option<f64> {
        self.edges
            .iter()
            .find(|c| c.edge_id == *edge_id)
            .map(|c| c.percent_along)
    }
}
