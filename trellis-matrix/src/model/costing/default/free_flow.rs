use crate::algorithm::costmatrix::EdgeLabel;
use crate::model::costing::{DynamicCost, HierarchyLimits, TravelMode};
use crate::model::network::{DirectedEdge, GraphTile, NodeInfo};
use crate::model::unit::Cost;

const BICYCLE_SPEED_KPH: f64 = 16.0;
const PEDESTRIAN_SPEED_KPH: f64 = 5.1;
const KPH_TO_MPS: f64 = 1.0 / 3.6;

/// Reference costing bundled with the engine: free-flow travel time is
/// both the optimization objective and the elapsed seconds. Autos travel
/// at each edge's stored speed; bicycles and pedestrians at a flat modal
/// speed. An optional flat turn penalty is charged at each transition.
#[derive(Debug)]
pub struct FreeFlowCost {
    mode: TravelMode,
    turn_penalty_secs: f64,
}

impl FreeFlowCost {
    pub fn new(mode: TravelMode) -> FreeFlowCost {
        FreeFlowCost {
            mode,
            turn_penalty_secs: 0.0,
        }
    }

    pub fn with_turn_penalty(mode: TravelMode, turn_penalty_secs: f64) -> FreeFlowCost {
        FreeFlowCost {
            mode,
            turn_penalty_secs,
        }
    }

    fn speed_mps(&self, edge: &DirectedEdge) -> f64 {
        let kph = match self.mode {
            TravelMode::Auto => edge.speed_kph,
            TravelMode::Bicycle => BICYCLE_SPEED_KPH,
            TravelMode::Pedestrian => PEDESTRIAN_SPEED_KPH,
        };
        kph * KPH_TO_MPS
    }

    fn traversal(&self, edge: &DirectedEdge) -> Cost {
        let secs = edge.length_m / self.speed_mps(edge);
        Cost::new(secs, secs)
    }

    fn turn(&self) -> Cost {
        Cost::new(self.turn_penalty_secs, self.turn_penalty_secs)
    }
}

impl DynamicCost for FreeFlowCost {
    fn allowed(
        &self,
        edge: &DirectedEdge,
        _pred: Option<&EdgeLabel>,
        _tile: &GraphTile,
        _timestamp: Option<u64>,
    ) -> bool {
        edge.allows(self.access_mode())
    }

    fn allowed_reverse(
        &self,
        _edge: &DirectedEdge,
        opp_edge: &DirectedEdge,
        _pred: Option<&EdgeLabel>,
        _tile: &GraphTile,
        _timestamp: Option<u64>,
    ) -> bool {
        // a traveler walking the path forward drives the opposing twin
        opp_edge.allows(self.access_mode())
    }

    fn edge_cost(&self, edge: &DirectedEdge, _tile: &GraphTile, _timestamp: Option<u64>) -> Cost {
        self.traversal(edge)
    }

    fn edge_cost_reverse(
        &self,
        opp_edge: &DirectedEdge,
        _tile: &GraphTile,
        _timestamp: Option<u64>,
    ) -> Cost {
        self.traversal(opp_edge)
    }

    fn transition_cost(&self, _node: &NodeInfo, _edge: &DirectedEdge, _pred: &EdgeLabel) -> Cost {
        self.turn()
    }

    fn transition_cost_reverse(
        &self,
        _node: &NodeInfo,
        _edge: &DirectedEdge,
        _pred: &EdgeLabel,
    ) -> Cost {
        self.turn()
    }

    fn access_mode(&self) -> u16 {
        self.mode.access_mask()
    }

    fn hierarchy_limits(&self) -> Vec<HierarchyLimits> {
        match self.mode {
            TravelMode::Auto => vec![
                HierarchyLimits::unrestricted(),
                HierarchyLimits::new(400, 100_000.0),
                HierarchyLimits::new(100, 5_000.0),
            ],
            // bicycle and pedestrian searches stay local; the cost
            // ceiling bounds them long before hierarchy pruning would
            TravelMode::Bicycle | TravelMode::Pedestrian => vec![
                HierarchyLimits::unrestricted(),
                HierarchyLimits::unrestricted(),
                HierarchyLimits::unrestricted(),
            ],
        }
    }
}
