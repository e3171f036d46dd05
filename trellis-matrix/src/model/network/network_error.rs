use super::GraphId;

#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("tile not found for graph id {0}")]
    TileNotFound(GraphId),
    #[error("directed edge not found for graph id {0}")]
    EdgeNotFound(GraphId),
    #[error("node not found for graph id {0}")]
    NodeNotFound(GraphId),
    #[error("{0}")]
    InternalError(String),
}
