use super::HierarchyLimits;
use crate::algorithm::costmatrix::EdgeLabel;
use crate::model::network::{DirectedEdge, GraphTile, NodeInfo};
use crate::model::unit::Cost;

/// Per-mode edge cost evaluation consumed by the matrix search.
///
/// Implementations decide whether an edge may be traversed, what it costs,
/// and what the edge-to-edge transition at a node costs. The engine calls
/// the reverse-direction analogs from its backward searches, where edges
/// are walked against their stored direction. An optional timestamp (epoch
/// seconds) carries the time-of-day snapshot when the query has time;
/// implementations without time-dependent costs may ignore it.
///
/// Costs returned must be finite and nonnegative; the engine treats
/// anything else as a contract violation and aborts the query.
pub trait DynamicCost: Send + Sync + std::fmt::Debug {
    /// whether the forward search may traverse `edge` coming from the
    /// predecessor label, if any. `pred` is `None` when seeding.
    fn allowed(
        &self,
        edge: &DirectedEdge,
        pred: Option<&EdgeLabel>,
        tile: &GraphTile,
        timestamp: Option<u64>,
    ) -> bool;

    /// whether the reverse search may traverse `edge` against its
    /// direction. `opp_edge` is the forward-direction twin that an actual
    /// traveler would drive.
    fn allowed_reverse(
        &self,
        edge: &DirectedEdge,
        opp_edge: &DirectedEdge,
        pred: Option<&EdgeLabel>,
        tile: &GraphTile,
        timestamp: Option<u64>,
    ) -> bool;

    /// cost of traversing the full edge in its stored direction
    fn edge_cost(&self, edge: &DirectedEdge, tile: &GraphTile, timestamp: Option<u64>) -> Cost;

    /// cost of the forward-direction twin `opp_edge`, as evaluated from a
    /// backward search
    fn edge_cost_reverse(
        &self,
        opp_edge: &DirectedEdge,
        tile: &GraphTile,
        timestamp: Option<u64>,
    ) -> Cost;

    /// cost of transitioning onto `edge` at `node` from the predecessor
    fn transition_cost(&self, node: &NodeInfo, edge: &DirectedEdge, pred: &EdgeLabel) -> Cost;

    /// reverse-direction analog of [`Self::transition_cost`]
    fn transition_cost_reverse(
        &self,
        node: &NodeInfo,
        edge: &DirectedEdge,
        pred: &EdgeLabel,
    ) -> Cost;

    /// bitmask of the access bits this costing requires on an edge
    fn access_mode(&self) -> u16;

    /// per hierarchy level expansion limits; each search copies these
    fn hierarchy_limits(&self) -> Vec<HierarchyLimits>;

    /// granularity of the fine buckets in the search priority queue
    fn unit_size(&self) -> f64 {
        1.0
    }
}
