use serde::{Deserialize, Serialize};

/// attributes of a node stored in a graph tile. outgoing directed edges
/// of a node occupy a contiguous index range within the same tile.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeInfo {
    /// index of the node's first outgoing edge within the tile
    pub edge_index: u32,
    /// number of outgoing edges
    pub edge_count: u32,
}

impl NodeInfo {
    pub fn new(edge_index: u32, edge_count: u32) -> NodeInfo {
        NodeInfo {
            edge_index,
            edge_count,
        }
    }
}
