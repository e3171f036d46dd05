use crate::model::network::GraphId;
use crate::model::unit::Cost;

/// The best meeting found so far for one (source, target) pair. The first
/// meeting of the frontiers is not necessarily on the globally cheapest
/// path, so the pair stays open for `threshold` further forward
/// iterations during which a strictly cheaper meeting may supersede it.
#[derive(Clone, Debug)]
pub struct BestCandidate {
    pub found: bool,
    /// meeting edge on the forward side
    pub edge_id: GraphId,
    /// its reverse-direction twin, reached by the reverse tree
    pub opp_edge_id: GraphId,
    pub cost: Cost,
    pub distance: f64,
    /// forward iterations left before the pair is finalized
    pub threshold: u32,
    /// pair was connected at seeding because both locations share an
    /// edge; its path is the partial edge itself
    pub trivial: bool,
}

impl Default for BestCandidate {
    fn default() -> BestCandidate {
        BestCandidate {
            found: false,
            edge_id: GraphId::INVALID,
            opp_edge_id: GraphId::INVALID,
            cost: Cost::MAX,
            distance: 0.0,
            threshold: 0,
            trivial: false,
        }
    }
}

impl BestCandidate {
    pub fn update(&mut self, edge_id: GraphId, opp_edge_id: GraphId, cost: Cost, distance: f64) {
        self.edge_id = edge_id;
        self.opp_edge_id = opp_edge_id;
        self.cost = cost;
        self.distance = distance;
    }
}
