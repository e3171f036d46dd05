use crate::model::network::GraphId;
use indexmap::IndexMap;

/// a target whose reverse tree has reached an edge, and where in its
/// label buffer the reached label sits
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetReach {
    pub target: u32,
    pub label_idx: u32,
}

/// Reverse index from an edge id to the targets whose backward searches
/// have reached it: the join structure between forward and reverse trees.
/// Inserts are append-only within one query; lookups by the forward
/// connection check are O(1) expected and see every insert made by any
/// earlier backward step. The data layout is private to keep it
/// swappable.
#[derive(Default)]
pub struct TargetMap {
    map: IndexMap<GraphId, Vec<TargetReach>>,
}

impl TargetMap {
    /// record that `target`'s reverse tree reached `edge_id`. repeated
    /// inserts for one (edge, target) pair keep a single entry, updated
    /// to the latest label index.
    pub fn insert(&mut self, edge_id: GraphId, target: u32, label_idx: u32) {
        let reaches = self.map.entry(edge_id).or_default();
        match reaches.iter_mut().find(|r| r.target == target) {
            Some(existing) => existing.label_idx = label_idx,
            None => reaches.push(TargetReach { target, label_idx }),
        }
    }

    /// the targets that have reached `edge_id`, if any
    pub fn reached_by(&self, edge_id: &GraphId) -> Option<&[TargetReach]> {
        self.map.get(edge_id).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut tm = TargetMap::default();
        let e = GraphId::new(2, 0, 1);
        tm.insert(e, 0, 10);
        tm.insert(e, 4, 11);
        let reaches = tm.reached_by(&e).unwrap();
        assert_eq!(reaches.len(), 2);
        assert_eq!(reaches[0], TargetReach { target: 0, label_idx: 10 });
        assert_eq!(reaches[1], TargetReach { target: 4, label_idx: 11 });
        assert!(tm.reached_by(&GraphId::new(2, 0, 2)).is_none());
    }

    #[test]
    fn test_reinsert_updates_label_index() {
        let mut tm = TargetMap::default();
        let e = GraphId::new(0, 3, 9);
        tm.insert(e, 1, 5);
        tm.insert(e, 1, 8);
        let reaches = tm.reached_by(&e).unwrap();
        assert_eq!(reaches.len(), 1);
        assert_eq!(reaches[0].label_idx, 8);
    }
}
