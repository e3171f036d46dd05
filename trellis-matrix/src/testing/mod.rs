//! In-memory graph fixtures shared by the unit tests: a builder that lays
//! out tiled networks from node/road tuples, and deterministic costings
//! with unit weights.

use crate::algorithm::costmatrix::EdgeLabel;
use crate::model::costing::{DynamicCost, HierarchyLimits, ALL_ACCESS, AUTO_ACCESS};
use crate::model::matrix::{CandidateEdge, MatrixLocation};
use crate::model::network::{DirectedEdge, GraphId, GraphReader, GraphTile, NodeInfo};
use crate::model::unit::Cost;
use itertools::Itertools;
use std::collections::BTreeMap;

const TEST_SPEED_KPH: f64 = 3.6; // one meter per second

struct Road {
    a: usize,
    b: usize,
    length_m: f64,
    access_ab: u16,
    access_ba: u16,
}

/// Builds a tiled network from nodes and two-way roads. Each node lives
/// on one hierarchy level (tile 0 of that level); a road contributes a
/// directed edge in each direction, wired to its twin through
/// `opp_index`. Dead ends and edge access fall out of the topology.
#[derive(Default)]
pub struct NetworkBuilder {
    node_levels: Vec<u8>,
    roads: Vec<Road>,
    not_thru: Vec<(usize, usize)>,
}

pub struct TestNetwork {
    pub reader: GraphReader,
    node_ids: Vec<GraphId>,
    edge_ids: BTreeMap<(usize, usize), GraphId>,
}

impl NetworkBuilder {
    pub fn new() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    /// add a node on the local level
    pub fn add_node(&mut self) -> usize {
        self.add_node_on_level(2)
    }

    pub fn add_node_on_level(&mut self, level: u8) -> usize {
        self.node_levels.push(level);
        self.node_levels.len() - 1
    }

    /// a road traversable in both directions
    pub fn add_road(&mut self, a: usize, b: usize, length_m: f64) -> &mut Self {
        self.roads.push(Road {
            a,
            b,
            length_m,
            access_ab: ALL_ACCESS,
            access_ba: ALL_ACCESS,
        });
        self
    }

    /// a road traversable only from `a` to `b`; the reverse twin exists
    /// but carries no access
    pub fn add_oneway(&mut self, a: usize, b: usize, length_m: f64) -> &mut Self {
        self.roads.push(Road {
            a,
            b,
            length_m,
            access_ab: ALL_ACCESS,
            access_ba: 0,
        });
        self
    }

    /// flag the directed edge from `a` to `b` as not-thru
    pub fn mark_not_thru(&mut self, a: usize, b: usize) -> &mut Self {
        self.not_thru.push((a, b));
        self
    }

    pub fn build(&self) -> TestNetwork {
        let n = self.node_levels.len();

        // per-node outgoing edges in road insertion order
        let mut outgoing: Vec<Vec<(usize, f64, u16)>> = vec![Vec::new(); n];
        for road in &self.roads {
            outgoing[road.a].push((road.b, road.length_m, road.access_ab));
            outgoing[road.b].push((road.a, road.length_m, road.access_ba));
        }

        // nodes keep their per-level order; edges pack per node
        let mut node_ids = vec![GraphId::INVALID; n];
        let levels: Vec<u8> = self.node_levels.iter().copied().unique().sorted().collect();
        for &level in &levels {
            for (local, node) in self.nodes_on_level(level).enumerate() {
                node_ids[node] = GraphId::new(level, 0, local as u32);
            }
        }

        // assign edge ids: per tile, nodes in local order, edges contiguous
        let mut edge_ids: BTreeMap<(usize, usize), GraphId> = BTreeMap::new();
        for &level in &levels {
            let mut next = 0u32;
            for node in self.nodes_on_level(level) {
                for &(to, _, _) in outgoing[node].iter() {
                    edge_ids.insert((node, to), GraphId::new(level, 0, next));
                    next += 1;
                }
            }
        }

        // materialize tiles
        let mut tiles = Vec::new();
        for &level in &levels {
            let mut nodes = Vec::new();
            let mut edges = Vec::new();
            for node in self.nodes_on_level(level) {
                let first = edges.len() as u32;
                for &(to, length_m, access) in &outgoing[node] {
                    let opp_slot = outgoing[to]
                        .iter()
                        .position(|&(back, _, _)| back == node)
                        .expect("road twin missing");
                    edges.push(DirectedEdge {
                        end_node: node_ids[to],
                        opp_index: opp_slot as u32,
                        length_m,
                        speed_kph: TEST_SPEED_KPH,
                        access,
                        not_thru: self.not_thru.contains(&(node, to)),
                        deadend: outgoing[to].len() == 1,
                    });
                }
                nodes.push(NodeInfo::new(first, outgoing[node].len() as u32));
            }
            tiles.push(GraphTile::new(GraphId::new(level, 0, 0), nodes, edges));
        }

        TestNetwork {
            reader: GraphReader::new(tiles),
            node_ids,
            edge_ids,
        }
    }

    fn nodes_on_level(&self, level: u8) -> impl Iterator<Item = usize> + '_ {
        self.node_levels
            .iter()
            .enumerate()
            .filter(move |&(_, &l)| l == level)
            .map(|(node, _)| node)
    }
}

impl TestNetwork {
    pub fn node(&self, node: usize) -> GraphId {
        self.node_ids[node]
    }

    pub fn edge(&self, from: usize, to: usize) -> GraphId {
        self.edge_ids[&(from, to)]
    }

    /// a source standing at a node: every outgoing edge, nothing of it
    /// yet traveled
    pub fn source_at_node(&self, node: usize) -> MatrixLocation {
        let edges = self
            .edge_ids
            .iter()
            .filter(|&(&(from, _), _)| from == node)
            .map(|(_, &id)| CandidateEdge::new(id, 0.0))
            .collect();
        MatrixLocation::new(edges)
    }

    /// a target standing at a node: every incoming edge, fully traveled
    pub fn target_at_node(&self, node: usize) -> MatrixLocation {
        let edges = self
            .edge_ids
            .iter()
            .filter(|&(&(_, to), _)| to == node)
            .map(|(_, &id)| CandidateEdge::new(id, 1.0))
            .collect();
        MatrixLocation::new(edges)
    }

    /// a location partway along one directed edge
    pub fn location_on_edge(&self, from: usize, to: usize, percent_along: f64) -> MatrixLocation {
        MatrixLocation::new(vec![CandidateEdge::new(self.edge(from, to), percent_along)])
    }
}

/// Unit-weight costing: cost and elapsed seconds both equal an edge's
/// length in meters, transitions are free unless a flat turn penalty is
/// configured. Keeps scenario arithmetic exact.
#[derive(Debug)]
pub struct UnitCost {
    turn_penalty: f64,
    hierarchy_limits: Vec<HierarchyLimits>,
}

impl UnitCost {
    pub fn new() -> UnitCost {
        UnitCost {
            turn_penalty: 0.0,
            hierarchy_limits: vec![HierarchyLimits::unrestricted(); 3],
        }
    }

    pub fn with_turn_penalty(penalty: f64) -> UnitCost {
        UnitCost {
            turn_penalty: penalty,
            ..UnitCost::new()
        }
    }

    pub fn with_hierarchy_limits(limits: Vec<HierarchyLimits>) -> UnitCost {
        UnitCost {
            turn_penalty: 0.0,
            hierarchy_limits: limits,
        }
    }
}

impl Default for UnitCost {
    fn default() -> UnitCost {
        UnitCost::new()
    }
}

impl DynamicCost for UnitCost {
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
        opp_edge.allows(self.access_mode())
    }

    fn edge_cost(&self, edge: &DirectedEdge, _tile: &GraphTile, _timestamp: Option<u64>) -> Cost {
        Cost::new(edge.length_m, edge.length_m)
    }

    fn edge_cost_reverse(
        &self,
        opp_edge: &DirectedEdge,
        _tile: &GraphTile,
        _timestamp: Option<u64>,
    ) -> Cost {
        Cost::new(opp_edge.length_m, opp_edge.length_m)
    }

    fn transition_cost(&self, _node: &NodeInfo, _edge: &DirectedEdge, _pred: &EdgeLabel) -> Cost {
        Cost::new(self.turn_penalty, self.turn_penalty)
    }

    fn transition_cost_reverse(
        &self,
        _node: &NodeInfo,
        _edge: &DirectedEdge,
        _pred: &EdgeLabel,
    ) -> Cost {
        Cost::new(self.turn_penalty, self.turn_penalty)
    }

    fn access_mode(&self) -> u16 {
        AUTO_ACCESS
    }

    fn hierarchy_limits(&self) -> Vec<HierarchyLimits> {
        self.hierarchy_limits.clone()
    }
}

/// Unit-weight costing whose edges become `factor` times more expensive
/// at and after a cutoff timestamp, for exercising time-aware recosting.
#[derive(Debug)]
pub struct TimeScaledCost {
    pub cutoff_epoch: u64,
    pub factor: f64,
}

impl TimeScaledCost {
    fn scaled(&self, length_m: f64, timestamp: Option<u64>) -> Cost {
        let factor = match timestamp {
            Some(ts) if ts >= self.cutoff_epoch => self.factor,
            _ => 1.0,
        };
        Cost::new(length_m * factor, length_m * factor)
    }
}

impl DynamicCost for TimeScaledCost {
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
        opp_edge.allows(self.access_mode())
    }

    fn edge_cost(&self, edge: &DirectedEdge, _tile: &GraphTile, timestamp: Option<u64>) -> Cost {
        self.scaled(edge.length_m, timestamp)
    }

    fn edge_cost_reverse(
        &self,
        opp_edge: &DirectedEdge,
        _tile: &GraphTile,
        timestamp: Option<u64>,
    ) -> Cost {
        self.scaled(opp_edge.length_m, timestamp)
    }

    fn transition_cost(&self, _node: &NodeInfo, _edge: &DirectedEdge, _pred: &EdgeLabel) -> Cost {
        Cost::ZERO
    }

    fn transition_cost_reverse(
        &self,
        _node: &NodeInfo,
        _edge: &DirectedEdge,
        _pred: &EdgeLabel,
    ) -> Cost {
        Cost::ZERO
    }

    fn access_mode(&self) -> u16 {
        AUTO_ACCESS
    }

    fn hierarchy_limits(&self) -> Vec<HierarchyLimits> {
        vec![HierarchyLimits::unrestricted(); 3]
    }
}

/// a map from some nodes to a matrix location at each, in node order
pub fn sources_at(net: &TestNetwork, nodes: &[usize]) -> Vec<MatrixLocation> {
    nodes.iter().map(|&n| net.source_at_node(n)).collect()
}

pub fn targets_at(net: &TestNetwork, nodes: &[usize]) -> Vec<MatrixLocation> {
    nodes.iter().map(|&n| net.target_at_node(n)).collect()
}

pub fn all_modes_table(costing: std::sync::Arc<dyn DynamicCost>) -> crate::model::costing::CostingTable {
    use crate::model::costing::{CostingTable, TravelMode};
    let mut table = CostingTable::empty();
    for mode in [TravelMode::Auto, TravelMode::Bicycle, TravelMode::Pedestrian] {
        table.insert(mode, costing.clone());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_wires_opposing_edges() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        let d = b.add_node();
        b.add_road(a, c, 10.0).add_road(c, d, 20.0);
        let net = b.build();

        let ac = net.edge(a, c);
        let ca = net.edge(c, a);
        assert_eq!(net.reader.opposing_edge_id(&ac).unwrap(), ca);
        assert_eq!(net.reader.opposing_edge_id(&ca).unwrap(), ac);

        let edge = net.reader.directed_edge(&ac).unwrap();
        assert_eq!(edge.end_node, net.node(c));
        assert_eq!(edge.length_m, 10.0);
        // node a has a single road, so the edge into it is a dead end
        let edge_back = net.reader.directed_edge(&ca).unwrap();
        assert!(edge_back.deadend);
        assert!(!edge.deadend);
    }

    #[test]
    fn test_builder_multi_level() {
        let mut b = NetworkBuilder::new();
        let local = b.add_node();
        let highway = b.add_node_on_level(0);
        b.add_road(local, highway, 100.0);
        let net = b.build();

        assert_eq!(net.node(local).level(), 2);
        assert_eq!(net.node(highway).level(), 0);
        assert_eq!(net.edge(local, highway).level(), 2);
        assert_eq!(net.edge(highway, local).level(), 0);
        assert_eq!(net.reader.n_tiles(), 2);
        assert_eq!(
            net.reader.opposing_edge_id(&net.edge(local, highway)).unwrap(),
            net.edge(highway, local)
        );
    }

    #[test]
    fn test_oneway_reverse_has_no_access() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        b.add_oneway(a, c, 5.0);
        let net = b.build();
        assert!(net.reader.directed_edge(&net.edge(a, c)).unwrap().allows(AUTO_ACCESS));
        assert!(!net.reader.directed_edge(&net.edge(c, a)).unwrap().allows(AUTO_ACCESS));
    }
}
