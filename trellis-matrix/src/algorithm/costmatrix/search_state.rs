use super::edge_label::EdgeLabel;
use super::edge_status::EdgeStatus;
use crate::model::costing::HierarchyLimits;
use crate::util::double_bucket_queue::DoubleBucketQueue;
use std::collections::HashSet;

/// Everything one source (forward) or target (reverse) search owns: its
/// queue, append-only label buffer, edge status map, a private copy of
/// the costing's hierarchy limits, and the time snapshot its costing
/// sees. All of it is allocated at query initialization and released by
/// `clear`.
pub struct LocationSearch {
    pub labels: Vec<EdgeLabel>,
    pub queue: DoubleBucketQueue,
    pub edge_status: EdgeStatus,
    pub hierarchy_limits: Vec<HierarchyLimits>,
    /// epoch seconds of departure (source) or arrival (target), when the
    /// query has time
    pub time: Option<u64>,
}

impl LocationSearch {
    pub fn new(
        reserved_labels: usize,
        cost_range: f64,
        bucket_size: f64,
        hierarchy_limits: Vec<HierarchyLimits>,
        time: Option<u64>,
    ) -> LocationSearch {
        LocationSearch {
            labels: Vec::with_capacity(reserved_labels),
            queue: DoubleBucketQueue::new(0.0, cost_range, bucket_size),
            edge_status: EdgeStatus::default(),
            hierarchy_limits,
            time,
        }
    }
}

/// Per-location termination bookkeeping: how many iterations the search
/// may still run after the last new connection involving it, and which
/// opposing-side locations it has not met yet. A threshold of zero means
/// the search contributes no further work.
#[derive(Clone, Debug)]
pub struct LocationStatus {
    pub threshold: u32,
    pub remaining: HashSet<u32>,
}

impl LocationStatus {
    pub fn new(threshold: u32, opposing_count: usize) -> LocationStatus {
        LocationStatus {
            threshold,
            remaining: (0..opposing_count as u32).collect(),
        }
    }
}
