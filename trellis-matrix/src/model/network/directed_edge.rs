use super::GraphId;
use serde::{Deserialize, Serialize};

/// attributes of a single directed edge stored in a graph tile.
/// an edge and its reverse-direction twin are separate records; the twin
/// is addressed through `opp_index`, its position among the outgoing
/// edges of this edge's end node.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct DirectedEdge {
    /// node this edge arrives at
    pub end_node: GraphId,
    /// position of the opposing edge within the end node's edge range
    pub opp_index: u32,
    /// arc length in meters
    pub length_m: f64,
    /// free-flow speed in km/h
    pub speed_kph: f64,
    /// bitmask of travel modes allowed in this edge's direction
    pub access: u16,
    /// edge is part of a region that through traffic may not cross
    pub not_thru: bool,
    /// edge terminates in a dead end, where a u-turn is permitted
    pub deadend: bool,
}

impl DirectedEdge {
    pub fn allows(&self, access_mode: u16) -> bool {
        self.access & access_mode != 0
    }
}
