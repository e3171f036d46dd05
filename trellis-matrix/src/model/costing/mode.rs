use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const AUTO_ACCESS: u16 = 1;
pub const BICYCLE_ACCESS: u16 = 2;
pub const PEDESTRIAN_ACCESS: u16 = 4;
pub const ALL_ACCESS: u16 = AUTO_ACCESS | BICYCLE_ACCESS | PEDESTRIAN_ACCESS;

/// travel mode of a matrix query, selecting the costing model and the
/// access bits checked against each directed edge
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Auto,
    Bicycle,
    Pedestrian,
}

impl TravelMode {
    pub fn access_mask(&self) -> u16 {
        match self {
            TravelMode::Auto => AUTO_ACCESS,
            TravelMode::Bicycle => BICYCLE_ACCESS,
            TravelMode::Pedestrian => PEDESTRIAN_ACCESS,
        }
    }
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelMode::Auto => write!(f, "auto"),
            TravelMode::Bicycle => write!(f, "bicycle"),
            TravelMode::Pedestrian => write!(f, "pedestrian"),
        }
    }
}
