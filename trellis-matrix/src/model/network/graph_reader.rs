use super::{DirectedEdge, GraphId, GraphTile, NetworkError, NodeInfo};
use std::collections::HashMap;

/// Shared reference to an immutable graph tile. With the default
/// `sync-tiles` feature this is atomically reference counted so tiles can
/// be shared across query threads; without it, a non-atomic `Rc` is used
/// for single-threaded embeddings.
#[cfg(feature = "sync-tiles")]
pub type TileRef = std::sync::Arc<GraphTile>;
#[cfg(not(feature = "sync-tiles"))]
pub type TileRef = std::rc::Rc<GraphTile>;

/// Lookup over the tiled road graph. The reader owns references to every
/// loaded tile; `get_tile` hands out shared references whose lifetime is
/// the longest holder. A missing tile is a contract violation on the part
/// of the caller and surfaces as a fatal error.
#[derive(Default)]
pub struct GraphReader {
    tiles: HashMap<u64, TileRef>,
}

impl GraphReader {
    pub fn new(tiles: Vec<GraphTile>) -> GraphReader {
        let tiles = tiles
            .into_iter()
            .map(|t| (t.id().0, TileRef::new(t)))
            .collect();
        GraphReader { tiles }
    }

    /// fetch the tile containing the given graph id
    pub fn get_tile(&self, id: &GraphId) -> Result<TileRef, NetworkError> {
        self.tiles
            .get(&id.tile_base().0)
            .cloned()
            .ok_or(NetworkError::TileNotFound(*id))
    }

    /// retrieve a copy of a `DirectedEdge` record. hot paths should
    /// instead hold the tile and borrow the edge from it.
    pub fn directed_edge(&self, edge_id: &GraphId) -> Result<DirectedEdge, NetworkError> {
        let tile = self.get_tile(edge_id)?;
        tile.directed_edge(edge_id).copied()
    }

    /// retrieve a copy of a `NodeInfo` record
    pub fn node_info(&self, node_id: &GraphId) -> Result<NodeInfo, NetworkError> {
        let tile = self.get_tile(node_id)?;
        tile.node(node_id).copied()
    }

    /// resolve the reverse-direction twin of a directed edge. the twin is
    /// found in the tile of the edge's end node, at the node's edge range
    /// offset by the edge's `opp_index`.
    pub fn opposing_edge_id(&self, edge_id: &GraphId) -> Result<GraphId, NetworkError> {
        let tile = self.get_tile(edge_id)?;
        let edge = *tile.directed_edge(edge_id)?;
        let end_tile = if edge.end_node.tile_base() == tile.id() {
            tile
        } else {
            self.get_tile(&edge.end_node)?
        };
        let node = end_tile.node(&edge.end_node)?;
        Ok(edge
            .end_node
            .with_index(node.edge_index + edge.opp_index))
    }

    pub fn n_tiles(&self) -> usize {
        self.tiles.len()
    }
}
