use super::TravelMode;

#[derive(thiserror::Error, Debug)]
pub enum CostingError {
    #[error("no costing registered for travel mode {0}")]
    UnknownMode(TravelMode),
    #[error("failure building costing model: {0}")]
    BuildError(String),
}
