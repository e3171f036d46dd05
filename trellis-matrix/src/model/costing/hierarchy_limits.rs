use serde::{Deserialize, Serialize};

/// Per hierarchy level expansion limits for one search. Far from its
/// origin, a search should climb to higher road classes rather than keep
/// exploring local streets; once a level has absorbed more than
/// `max_up_transitions` upward transitions and the frontier has traveled
/// beyond `expand_within_distance` meters, expansion at that level stops.
///
/// Each per-location search owns its own copy, so pruning one source's
/// frontier never affects another's.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct HierarchyLimits {
    pub max_up_transitions: u32,
    pub expand_within_distance: f64,
    #[serde(skip)]
    pub up_transition_count: u32,
}

impl HierarchyLimits {
    pub fn new(max_up_transitions: u32, expand_within_distance: f64) -> HierarchyLimits {
        HierarchyLimits {
            max_up_transitions,
            expand_within_distance,
            up_transition_count: 0,
        }
    }

    /// a level with no caps, used for the topmost road classes
    pub fn unrestricted() -> HierarchyLimits {
        HierarchyLimits::new(u32::MAX, f64::MAX)
    }

    /// whether expansion at this level is forbidden for a frontier that
    /// has traveled `distance` meters from its origin
    pub fn stop_expanding(&self, distance: f64) -> bool {
        self.up_transition_count > self.max_up_transitions && distance > self.expand_within_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_never_stops() {
        let mut hl = HierarchyLimits::unrestricted();
        hl.up_transition_count = 1_000_000;
        assert!(!hl.stop_expanding(f64::MAX / 2.0));
    }

    #[test]
    fn test_stops_only_beyond_both_caps() {
        let mut hl = HierarchyLimits::new(2, 5000.0);
        assert!(!hl.stop_expanding(10_000.0));
        hl.up_transition_count = 3;
        assert!(!hl.stop_expanding(4000.0));
        assert!(hl.stop_expanding(10_000.0));
    }
}
