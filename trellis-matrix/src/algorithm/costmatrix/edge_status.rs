use super::edge_label::INVALID_LABEL;
use crate::model::network::GraphId;
use std::collections::HashMap;

/// where an edge stands within one per-location search
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeSet {
    /// never touched
    Unreached,
    /// labeled and in the queue
    Temporary,
    /// popped and relaxed; never revisited
    Permanent,
}

#[derive(Copy, Clone, Debug)]
pub struct EdgeStatusInfo {
    pub set: EdgeSet,
    pub label_idx: u32,
}

/// Per-search map from edge id to its status and label index, letting
/// relaxation find the queued label for an edge in O(1) expected. One
/// instance exists per source (forward) and per target (reverse).
#[derive(Default)]
pub struct EdgeStatus {
    map: HashMap<GraphId, EdgeStatusInfo>,
}

impl EdgeStatus {
    pub fn get(&self, edge_id: &GraphId) -> EdgeStatusInfo {
        self.map.get(edge_id).copied().unwrap_or(EdgeStatusInfo {
            set: EdgeSet::Unreached,
            label_idx: INVALID_LABEL,
        })
    }

    pub fn set_temporary(&mut self, edge_id: GraphId, label_idx: u32) {
        self.map.insert(
            edge_id,
            EdgeStatusInfo {
                set: EdgeSet::Temporary,
                label_idx,
            },
        );
    }

    /// settle an edge, keeping its label index
    pub fn set_permanent(&mut self, edge_id: &GraphId) {
        if let Some(info) = self.map.get_mut(edge_id) {
            info.set = EdgeSet::Permanent;
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut status = EdgeStatus::default();
        let e = GraphId::new(2, 0, 7);
        assert_eq!(status.get(&e).set, EdgeSet::Unreached);

        status.set_temporary(e, 3);
        let info = status.get(&e);
        assert_eq!(info.set, EdgeSet::Temporary);
        assert_eq!(info.label_idx, 3);

        status.set_permanent(&e);
        let info = status.get(&e);
        assert_eq!(info.set, EdgeSet::Permanent);
        assert_eq!(info.label_idx, 3);
    }

    #[test]
    fn test_settling_unreached_edge_is_a_noop() {
        let mut status = EdgeStatus::default();
        let e = GraphId::new(0, 0, 0);
        status.set_permanent(&e);
        assert_eq!(status.get(&e).set, EdgeSet::Unreached);
    }
}
