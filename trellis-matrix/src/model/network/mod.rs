mod directed_edge;
mod graph_id;
mod graph_reader;
mod graph_tile;
mod network_error;
mod node_info;

pub use directed_edge::DirectedEdge;
pub use graph_id::GraphId;
pub use graph_reader::{GraphReader, TileRef};
pub use graph_tile::GraphTile;
pub use network_error::NetworkError;
pub use node_info::NodeInfo;
