use ordered_float::OrderedFloat;

/// Priority queue over edge label indices, keyed by cost with two-level
/// bucketing. Labels within the low-cost range land in fine buckets of
/// `bucket_size` resolution; everything beyond goes to an overflow list
/// that is redistributed when the fine range drains. Push, pop-min, and
/// in-place reweight are all amortized O(1) for the bounded-range keys a
/// Dijkstra expansion produces.
///
/// Entries are bare `u32` label indices; the caller owns the label buffer
/// and passes costs explicitly, including the old cost on reweight.
pub struct DoubleBucketQueue {
    buckets: Vec<Vec<u32>>,
    overflow: Vec<(u32, f64)>,
    bucket_size: f64,
    mincost: f64,
    maxcost: f64,
    current: usize,
    size: usize,
}

const DEFAULT_BUCKET_COUNT: usize = 20_000;
const MAX_BUCKET_COUNT: usize = 100_000;

impl DoubleBucketQueue {
    /// # Arguments
    ///
    /// * `mincost` - lowest cost that will ever be pushed
    /// * `range` - width of the fine-bucket cost range
    /// * `bucket_size` - fine bucket resolution, the costing's unit size
    pub fn new(mincost: f64, range: f64, bucket_size: f64) -> DoubleBucketQueue {
        let bucket_size = if bucket_size.is_finite() && bucket_size > 0.0 {
            bucket_size
        } else {
            1.0
        };
        let bucket_count = if range.is_finite() && range > bucket_size {
            ((range / bucket_size).ceil() as usize).clamp(1, MAX_BUCKET_COUNT)
        } else {
            DEFAULT_BUCKET_COUNT
        };
        let mincost = if mincost.is_finite() { mincost.max(0.0) } else { 0.0 };
        DoubleBucketQueue {
            buckets: vec![Vec::new(); bucket_count],
            overflow: Vec::new(),
            bucket_size,
            mincost,
            maxcost: mincost + bucket_count as f64 * bucket_size,
            current: 0,
            size: 0,
        }
    }

    /// add a label with the given cost
    pub fn add(&mut self, label: u32, cost: f64) {
        if cost < self.maxcost {
            let idx = self.bucket_index(cost);
            self.buckets[idx].push(label);
        } else {
            self.overflow.push((label, cost));
        }
        self.size += 1;
    }

    /// reweight a queued label to a lower cost. the caller supplies the
    /// cost the label was queued under so the old entry can be located.
    pub fn decrease(&mut self, label: u32, old_cost: f64, new_cost: f64) {
        debug_assert!(new_cost <= old_cost);
        if old_cost < self.maxcost {
            let idx = self.bucket_index(old_cost);
            if let Some(pos) = self.buckets[idx].iter().position(|&l| l == label) {
                self.buckets[idx].swap_remove(pos);
                self.size -= 1;
            }
        } else if let Some(pos) = self.overflow.iter().position(|&(l, _)| l == label) {
            self.overflow.swap_remove(pos);
            self.size -= 1;
        }
        self.add(label, new_cost);
    }

    /// remove and return a label with minimal bucketed cost. `None` when
    /// the queue is exhausted.
    pub fn pop(&mut self) -> Option<u32> {
        loop {
            while self.current < self.buckets.len() {
                if let Some(label) = self.buckets[self.current].pop() {
                    self.size -= 1;
                    return Some(label);
                }
                self.current += 1;
            }
            if self.overflow.is_empty() {
                return None;
            }
            self.rebase();
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.overflow.clear();
        self.mincost = 0.0;
        self.maxcost = self.buckets.len() as f64 * self.bucket_size;
        self.current = 0;
        self.size = 0;
    }

    fn bucket_index(&self, cost: f64) -> usize {
        let idx = ((cost - self.mincost) / self.bucket_size) as usize;
        // float rounding must never place an entry behind the cursor or
        // past the fine range
        idx.clamp(self.current, self.buckets.len() - 1)
    }

    /// the fine range has drained; restart it at the cheapest overflow
    /// cost and pull every overflow entry that now fits back in
    fn rebase(&mut self) {
        let min = self
            .overflow
            .iter()
            .map(|&(_, c)| OrderedFloat(c))
            .min()
            .map(|c| c.0)
            .unwrap_or(0.0);
        self.mincost = min;
        self.maxcost = min + self.buckets.len() as f64 * self.bucket_size;
        self.current = 0;
        let entries = std::mem::take(&mut self.overflow);
        for (label, cost) in entries {
            if cost < self.maxcost {
                let idx = self.bucket_index(cost);
                self.buckets[idx].push(label);
            } else {
                self.overflow.push((label, cost));
            }
        }
    }
}
