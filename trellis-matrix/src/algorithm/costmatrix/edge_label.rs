use crate::model::network::GraphId;
use crate::model::unit::Cost;

/// predecessor index of a seed label
pub const INVALID_LABEL: u32 = u32::MAX;

/// A settled or frontier record of one per-location search, forward or
/// reverse. Labels are append-only within a search; their index in the
/// label buffer is stable and serves as the predecessor pointer, so the
/// chain from any label terminates at an origin seed.
#[derive(Clone, Debug)]
pub struct EdgeLabel {
    /// index of the predecessor label, or `INVALID_LABEL` for a seed
    pub pred_idx: u32,
    /// the directed edge this label traverses
    pub edge_id: GraphId,
    /// the reverse-direction twin of `edge_id`
    pub opp_edge_id: GraphId,
    /// node at the far end of `edge_id`, where expansion continues
    pub end_node: GraphId,
    /// accumulated cost from the root through this edge
    pub cost: Cost,
    /// accumulated arc length in meters
    pub distance: f64,
    /// hierarchy level of the edge
    pub level: u8,
    /// edge lies in a not-thru region
    pub not_thru: bool,
    /// edge ends in a dead end, where a u-turn is permitted
    pub deadend: bool,
    /// transition cost paid to access this edge, kept so paths can be
    /// reconstructed and meeting costs combined without re-evaluation
    pub transition_cost: Cost,
}

impl EdgeLabel {
    pub fn is_seed(&self) -> bool {
        self.pred_idx == INVALID_LABEL
    }
}
