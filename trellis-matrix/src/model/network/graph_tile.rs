use super::{DirectedEdge, GraphId, NetworkError, NodeInfo};

/// Immutable storage unit of the partitioned road graph. A tile holds the
/// nodes and directed edges of one tile id at one hierarchy level; element
/// ids embed the owning tile so lookups can verify membership.
///
/// Tiles are snapshots: the engine never mutates tile contents, and tile
/// references may be shared across concurrent queries by the caller.
#[derive(Debug)]
pub struct GraphTile {
    id: GraphId,
    nodes: Vec<NodeInfo>,
    edges: Vec<DirectedEdge>,
}

impl GraphTile {
    pub fn new(id: GraphId, nodes: Vec<NodeInfo>, edges: Vec<DirectedEdge>) -> GraphTile {
        GraphTile {
            id: id.tile_base(),
            nodes,
            edges,
        }
    }

    /// the tile's base id (level and tile id, zero index)
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// retrieve a `DirectedEdge` record from this tile
    ///
    /// # Arguments
    ///
    /// * `edge_id` - the `GraphId` of the edge; must belong to this tile
    ///
    /// # Returns
    ///
    /// The associated `DirectedEdge` or an error if the id is missing
    pub fn directed_edge(&self, edge_id: &GraphId) -> Result<&DirectedEdge, NetworkError> {
        if edge_id.tile_base() != self.id {
            return Err(NetworkError::EdgeNotFound(*edge_id));
        }
        self.edges
            .get(edge_id.index() as usize)
            .ok_or(NetworkError::EdgeNotFound(*edge_id))
    }

    /// retrieve a `NodeInfo` record from this tile
    pub fn node(&self, node_id: &GraphId) -> Result<&NodeInfo, NetworkError> {
        if node_id.tile_base() != self.id {
            return Err(NetworkError::NodeNotFound(*node_id));
        }
        self.nodes
            .get(node_id.index() as usize)
            .ok_or(NetworkError::NodeNotFound(*node_id))
    }

    /// ids of the outgoing directed edges of a node, all within this tile
    pub fn node_edge_ids(&self, node: &NodeInfo) -> impl Iterator<Item = GraphId> + '_ {
        let base = self.id;
        (node.edge_index..node.edge_index + node.edge_count).map(move |i| base.with_index(i))
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }
}
