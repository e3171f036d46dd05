use super::default::FreeFlowCost;
use super::{CostingError, DynamicCost, TravelMode};
use std::collections::HashMap;
use std::sync::Arc;

/// registry of costing models by travel mode, supplied by the caller to
/// each matrix query
pub struct CostingTable {
    costings: HashMap<TravelMode, Arc<dyn DynamicCost>>,
}

impl CostingTable {
    pub fn empty() -> CostingTable {
        CostingTable {
            costings: HashMap::new(),
        }
    }

    pub fn insert(&mut self, mode: TravelMode, costing: Arc<dyn DynamicCost>) {
        self.costings.insert(mode, costing);
    }

    pub fn get(&self, mode: TravelMode) -> Result<Arc<dyn DynamicCost>, CostingError> {
        self.costings
            .get(&mode)
            .cloned()
            .ok_or(CostingError::UnknownMode(mode))
    }
}

impl Default for CostingTable {
    /// bundles the free-flow costing for every travel mode
    fn default() -> CostingTable {
        let mut table = CostingTable::empty();
        for mode in [TravelMode::Auto, TravelMode::Bicycle, TravelMode::Pedestrian] {
            table.insert(mode, Arc::new(FreeFlowCost::new(mode)));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_all_modes() {
        let table = CostingTable::default();
        for mode in [TravelMode::Auto, TravelMode::Bicycle, TravelMode::Pedestrian] {
            assert!(table.get(mode).is_ok());
        }
    }

    #[test]
    fn test_empty_table_reports_unknown_mode() {
        let table = CostingTable::empty();
        let err = table.get(TravelMode::Bicycle).unwrap_err();
        assert!(matches!(err, CostingError::UnknownMode(TravelMode::Bicycle)));
    }
}
