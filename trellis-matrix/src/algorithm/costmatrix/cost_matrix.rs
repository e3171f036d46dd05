use super::best_candidate::BestCandidate;
use super::edge_label::{EdgeLabel, INVALID_LABEL};
use super::edge_status::EdgeSet;
use super::matrix_error::MatrixError;
use super::search_state::{LocationSearch, LocationStatus};
use super::target_map::{TargetMap, TargetReach};
use crate::config::MatrixConfig;
use crate::model::costing::{CostingTable, DynamicCost};
use crate::model::matrix::{date_time, MatrixCell, MatrixLocation, MatrixRequest, MatrixResult};
use crate::model::network::{GraphId, GraphReader};
use crate::model::unit::Cost;
use itertools::iproduct;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::sync::Arc;

/// Many-to-many cost matrix engine. Runs one forward search per source
/// and one reverse search per target against the shared tiled graph,
/// advancing every active search one settled edge at a time in
/// round-robin so no one search can starve the others. Forward
/// settles are the single meeting point: each one consults the target
/// map for reverse trees that already reached the opposing edge.
///
/// The engine is single-threaded cooperative within one query and holds
/// no process-wide state; run queries in parallel by giving each thread
/// its own instance over a shared [`GraphReader`].
pub struct CostMatrix {
    pub(crate) config: MatrixConfig,
    pub(crate) forward: Vec<LocationSearch>,
    pub(crate) reverse: Vec<LocationSearch>,
    pub(crate) source_status: Vec<LocationStatus>,
    pub(crate) target_status: Vec<LocationStatus>,
    pub(crate) best_connection: Vec<BestCandidate>,
    pub(crate) target_map: TargetMap,
    pub(crate) source_count: usize,
    pub(crate) target_count: usize,
    pub(crate) current_cost_threshold: f64,
    pub(crate) remaining_sources: usize,
    pub(crate) remaining_targets: usize,
    pub(crate) edges_settled: u64,
}

impl Default for CostMatrix {
    fn default() -> CostMatrix {
        CostMatrix {
            config: MatrixConfig::default(),
            forward: Vec::new(),
            reverse: Vec::new(),
            source_status: Vec::new(),
            target_status: Vec::new(),
            best_connection: Vec::new(),
            target_map: TargetMap::default(),
            source_count: 0,
            target_count: 0,
            current_cost_threshold: 0.0,
            remaining_sources: 0,
            remaining_targets: 0,
            edges_settled: 0,
        }
    }
}

impl CostMatrix {
    pub fn new(config: MatrixConfig) -> Result<CostMatrix, MatrixError> {
        config.validate().map_err(MatrixError::BuildError)?;
        Ok(CostMatrix {
            config,
            ..Default::default()
        })
    }

    /// release all per-location state. called on entry and exit of every
    /// query, so labels and queues never outlive the query that built
    /// them.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
        self.source_status.clear();
        self.target_status.clear();
        self.best_connection.clear();
        self.target_map.clear();
        self.source_count = 0;
        self.target_count = 0;
        self.current_cost_threshold = 0.0;
        self.remaining_sources = 0;
        self.remaining_targets = 0;
        self.edges_settled = 0;
    }

    /// Populate the S×T matrix of best-cost paths between every source
    /// and target of the request.
    ///
    /// Recoverable conditions (a location with no usable candidate edge,
    /// a pair out of reach within the cost ceiling) appear as not-found
    /// cells; only contract violations (missing tiles, invalid costs,
    /// label exhaustion) return an error. The optional `interrupt`
    /// sentinel is polled between outer iterations; when it trips, the
    /// partial matrix is returned with its `cancelled` flag set.
    pub fn source_to_target(
        &mut self,
        request: &MatrixRequest,
        reader: &GraphReader,
        costing_table: &CostingTable,
        interrupt: Option<&dyn Fn() -> bool>,
    ) -> Result<MatrixResult, MatrixError> {
        self.clear();
        if !request.max_matrix_distance.is_finite() || request.max_matrix_distance <= 0.0 {
            return Err(MatrixError::BuildError(
                "max_matrix_distance must be positive".to_string(),
            ));
        }
        let costing = costing_table.get(request.mode)?;
        if request.sources.is_empty() || request.targets.is_empty() {
            return Ok(MatrixResult::default());
        }

        self.current_cost_threshold = self
            .config
            .cost_threshold(request.mode, request.max_matrix_distance);
        self.initialize(request, &costing)?;
        self.set_sources(request, reader, &costing)?;
        self.set_targets(request, reader, &costing)?;
        self.connect_trivial(request, reader, &costing)?;

        let mut cancelled = false;
        let mut iterations: u64 = 0;
        while self.remaining_sources > 0 {
            if let Some(sentinel) = interrupt {
                if sentinel() {
                    log::debug!("matrix query cancelled after {} iterations", iterations);
                    cancelled = true;
                    break;
                }
            }
            for source in 0..self.source_count {
                if self.source_status[source].threshold > 0 {
                    self.forward_search(source, reader, &costing)?;
                }
            }
            if self.remaining_targets > 0 {
                for target in 0..self.target_count {
                    if self.target_status[target].threshold > 0 {
                        self.backward_search(target, reader, &costing)?;
                    }
                }
            }
            iterations += 1;
        }

        if request.has_time && !request.invariant && !cancelled {
            self.recost_paths(request, reader, &costing)?;
        }

        let found = self.best_connection.iter().filter(|c| c.found).count();
        log::debug!(
            "matrix {}x{}: {}/{} pairs found, {} edges settled, {} iterations",
            self.source_count,
            self.target_count,
            found,
            self.best_connection.len(),
            self.edges_settled,
            iterations
        );

        let result = self.build_result(request, cancelled);
        self.clear();
        Ok(result)
    }

    /// allocate per-location state and parse location times
    fn initialize(
        &mut self,
        request: &MatrixRequest,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        self.source_count = request.sources.len();
        self.target_count = request.targets.len();
        let reserved = self
            .config
            .max_reserved_labels_count
            .min(self.config.max_label_count);
        let bucket_size = costing.unit_size();
        let range = self.current_cost_threshold;
        let window = self.config.pair_meeting_threshold;

        for location in request.sources.iter() {
            let time = parse_location_time(location, request.has_time)?;
            self.forward.push(LocationSearch::new(
                reserved,
                range,
                bucket_size,
                costing.hierarchy_limits(),
                time,
            ));
            self.source_status
                .push(LocationStatus::new(window, self.target_count));
        }
        for location in request.targets.iter() {
            let time = parse_location_time(location, request.has_time)?;
            self.reverse.push(LocationSearch::new(
                reserved,
                range,
                bucket_size,
                costing.hierarchy_limits(),
                time,
            ));
            self.target_status
                .push(LocationStatus::new(window, self.source_count));
        }
        self.best_connection =
            vec![BestCandidate::default(); self.source_count * self.target_count];
        self.remaining_sources = self.source_count;
        self.remaining_targets = self.target_count;
        Ok(())
    }

    /// seed each source's forward queue from its candidate edges, scaling
    /// the initial cost by the portion of the edge still ahead
    fn set_sources(
        &mut self,
        request: &MatrixRequest,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        for (index, location) in request.sources.iter().enumerate() {
            let time = self.forward[index].time;
            for candidate in &location.edges {
                let tile = reader.get_tile(&candidate.edge_id)?;
                let edge = tile.directed_edge(&candidate.edge_id)?;
                if !costing.allowed(edge, None, &tile, time) {
                    continue;
                }
                let percent = candidate.percent_along.clamp(0.0, 1.0);
                let cost = costing.edge_cost(edge, &tile, time) * (1.0 - percent);
                if !cost.is_valid() {
                    return Err(MatrixError::InvalidCost(candidate.edge_id));
                }
                let distance = edge.length_m * (1.0 - percent);
                let opp_edge_id = reader.opposing_edge_id(&candidate.edge_id)?;
                let seed = EdgeLabel {
                    pred_idx: INVALID_LABEL,
                    edge_id: candidate.edge_id,
                    opp_edge_id,
                    end_node: edge.end_node,
                    cost,
                    distance,
                    level: candidate.edge_id.level(),
                    not_thru: edge.not_thru,
                    deadend: edge.deadend,
                    transition_cost: Cost::ZERO,
                };
                relax_seed(&mut self.forward[index], seed);
            }
            if self.forward[index].labels.is_empty() {
                log::debug!("source {} has no usable candidate edges", index);
                self.terminate_source(index);
            }
        }
        Ok(())
    }

    /// seed each target's reverse queue on the opposing orientation of
    /// its candidate edges and pre-register the seeds in the target map
    fn set_targets(
        &mut self,
        request: &MatrixRequest,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        for (index, location) in request.targets.iter().enumerate() {
            let time = self.reverse[index].time;
            for candidate in &location.edges {
                let tile = reader.get_tile(&candidate.edge_id)?;
                let edge = tile.directed_edge(&candidate.edge_id)?;
                let opp_edge_id = reader.opposing_edge_id(&candidate.edge_id)?;
                let opp_tile = reader.get_tile(&opp_edge_id)?;
                let opp_edge = opp_tile.directed_edge(&opp_edge_id)?;
                if !costing.allowed_reverse(opp_edge, edge, None, &opp_tile, time) {
                    continue;
                }
                let percent = candidate.percent_along.clamp(0.0, 1.0);
                let cost = costing.edge_cost_reverse(edge, &tile, time) * percent;
                if !cost.is_valid() {
                    return Err(MatrixError::InvalidCost(candidate.edge_id));
                }
                let distance = edge.length_m * percent;
                let seed = EdgeLabel {
                    pred_idx: INVALID_LABEL,
                    edge_id: opp_edge_id,
                    opp_edge_id: candidate.edge_id,
                    end_node: opp_edge.end_node,
                    cost,
                    distance,
                    level: opp_edge_id.level(),
                    not_thru: opp_edge.not_thru,
                    deadend: opp_edge.deadend,
                    transition_cost: Cost::ZERO,
                };
                let label_idx = relax_seed(&mut self.reverse[index], seed);
                self.target_map
                    .insert(opp_edge_id, index as u32, label_idx);
            }
            if self.reverse[index].labels.is_empty() {
                log::debug!("target {} has no usable candidate edges", index);
                self.terminate_target(index);
            }
        }
        Ok(())
    }

    /// connect pairs whose locations share a candidate edge with the
    /// source at or behind the target. the partial edge between them is
    /// the exact best path, so these pairs are finalized immediately.
    fn connect_trivial(
        &mut self,
        request: &MatrixRequest,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        for (s, source) in request.sources.iter().enumerate() {
            for (t, target) in request.targets.iter().enumerate() {
                let mut connected = false;
                for (se, te) in iproduct!(&source.edges, &target.edges) {
                    if se.edge_id != te.edge_id || se.percent_along > te.percent_along {
                        continue;
                    }
                    let tile = reader.get_tile(&se.edge_id)?;
                    let edge = tile.directed_edge(&se.edge_id)?;
                    let time = self.forward[s].time;
                    if !costing.allowed(edge, None, &tile, time) {
                        continue;
                    }
                    let portion = te.percent_along - se.percent_along;
                    let cost = costing.edge_cost(edge, &tile, time) * portion;
                    if !cost.is_valid() {
                        return Err(MatrixError::InvalidCost(se.edge_id));
                    }
                    let distance = edge.length_m * portion;
                    let opp_edge_id = reader.opposing_edge_id(&se.edge_id)?;
                    let conn = &mut self.best_connection[s * self.target_count + t];
                    if !conn.found
                        || improves(
                            &cost,
                            distance,
                            se.edge_id,
                            &conn.cost,
                            conn.distance,
                            conn.edge_id,
                        )
                    {
                        conn.found = true;
                        conn.trivial = true;
                        conn.threshold = 0;
                        conn.update(se.edge_id, opp_edge_id, cost, distance);
                        connected = true;
                    }
                }
                if connected {
                    self.update_status(s, t);
                }
            }
        }
        Ok(())
    }

    /// one step of source `source`: pop the cheapest edge, settle it,
    /// look for meetings with reverse trees, relax its successors, and
    /// age the termination thresholds
    fn forward_search(
        &mut self,
        source: usize,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        // age the supersede window of pairs that met on earlier iterations
        for t in 0..self.target_count {
            let conn = &mut self.best_connection[source * self.target_count + t];
            if conn.found && conn.threshold > 0 {
                conn.threshold -= 1;
            }
        }

        let threshold = self.current_cost_threshold;
        let (pred_idx, pred) = {
            let search = &mut self.forward[source];
            match search.queue.pop() {
                None => {
                    self.terminate_source(source);
                    return Ok(());
                }
                Some(idx) => {
                    let label = search.labels[idx as usize].clone();
                    // the queue is cost ordered, so everything after this
                    // label is out of reach as well
                    if label.cost.cost > threshold {
                        self.terminate_source(source);
                        return Ok(());
                    }
                    search.edge_status.set_permanent(&label.edge_id);
                    (idx, label)
                }
            }
        };
        self.edges_settled += 1;

        let updated = self.check_forward_connections(source, &pred);
        self.expand_forward(source, pred_idx, &pred, reader, costing)?;

        // once every pair has met, the search only continues to look for
        // cheaper meetings; count that allowance down
        let status = &mut self.source_status[source];
        if !updated && status.remaining.is_empty() && status.threshold > 0 {
            status.threshold -= 1;
            if status.threshold == 0 {
                self.remaining_sources -= 1;
            }
        }
        Ok(())
    }

    /// one step of target `target`. reverse settles publish to the target
    /// map but do not themselves look for meetings; forward settles are
    /// the single detection point so every pair is found exactly once.
    fn backward_search(
        &mut self,
        target: usize,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        let threshold = self.current_cost_threshold;
        let (pred_idx, pred) = {
            let search = &mut self.reverse[target];
            match search.queue.pop() {
                None => {
                    self.terminate_target(target);
                    return Ok(());
                }
                Some(idx) => {
                    let label = search.labels[idx as usize].clone();
                    if label.cost.cost > threshold {
                        self.terminate_target(target);
                        return Ok(());
                    }
                    search.edge_status.set_permanent(&label.edge_id);
                    (idx, label)
                }
            }
        };
        self.edges_settled += 1;
        self.target_map.insert(pred.edge_id, target as u32, pred_idx);

        self.expand_reverse(target, pred_idx, &pred, reader, costing)?;

        let status = &mut self.target_status[target];
        if status.remaining.is_empty() && status.threshold > 0 {
            status.threshold -= 1;
            if status.threshold == 0 {
                self.remaining_targets -= 1;
            }
        }
        Ok(())
    }

    /// look up the settled edge's opposing twin in the target map and
    /// fold any meetings into the best connections
    fn check_forward_connections(&mut self, source: usize, pred: &EdgeLabel) -> bool {
        let reaches: Vec<TargetReach> = match self.target_map.reached_by(&pred.opp_edge_id) {
            Some(reaches) => reaches.to_vec(),
            None => return false,
        };
        let window = self.config.pair_meeting_threshold;
        let mut updated = false;
        for reach in reaches {
            let target = reach.target as usize;
            let idx = source * self.target_count + target;
            if self.best_connection[idx].found && self.best_connection[idx].threshold == 0 {
                // pair is finalized
                continue;
            }
            // the forward label already paid for the meeting edge in
            // full; take the reverse contribution from beyond it
            let (opp_cost, opp_distance) = {
                let labels = &self.reverse[target].labels;
                let opp_label = &labels[reach.label_idx as usize];
                if opp_label.is_seed() {
                    if pred.is_seed() {
                        // both locations sit on this edge; the in-edge
                        // case was connected at seeding, anything else
                        // needs a path through real labels
                        continue;
                    }
                    (Cost::ZERO, 0.0)
                } else {
                    let beyond = &labels[opp_label.pred_idx as usize];
                    (beyond.cost + opp_label.transition_cost, beyond.distance)
                }
            };
            let cost = pred.cost + opp_cost;
            let distance = pred.distance + opp_distance;

            let mut first_meeting = false;
            {
                let conn = &mut self.best_connection[idx];
                if !conn.found {
                    conn.found = true;
                    conn.threshold = window;
                    conn.update(pred.edge_id, pred.opp_edge_id, cost, distance);
                    first_meeting = true;
                    updated = true;
                } else if improves(
                    &cost,
                    distance,
                    pred.edge_id,
                    &conn.cost,
                    conn.distance,
                    conn.edge_id,
                ) {
                    conn.update(pred.edge_id, pred.opp_edge_id, cost, distance);
                    updated = true;
                }
            }
            if first_meeting {
                self.update_status(source, target);
            }
        }
        updated
    }

    /// relax every outgoing edge at the end node of a settled forward
    /// label
    fn expand_forward(
        &mut self,
        source: usize,
        pred_idx: u32,
        pred: &EdgeLabel,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        let tile = reader.get_tile(&pred.end_node)?;
        let node = tile.node(&pred.end_node)?;
        let max_labels = self.config.max_label_count;
        let search = &mut self.forward[source];

        for edge_id in tile.node_edge_ids(node) {
            // a u-turn is only allowed out of a dead end
            if edge_id == pred.opp_edge_id && !pred.deadend {
                continue;
            }
            let status = search.edge_status.get(&edge_id);
            if status.set == EdgeSet::Permanent {
                continue;
            }
            let edge = tile.directed_edge(&edge_id)?;
            // not-thru regions may be left but not entered
            if edge.not_thru && !pred.not_thru {
                continue;
            }
            let level = edge_id.level();
            if level < pred.level {
                if let Some(limits) = search.hierarchy_limits.get_mut(pred.level as usize) {
                    limits.up_transition_count += 1;
                }
            }
            if let Some(limits) = search.hierarchy_limits.get(level as usize) {
                if limits.stop_expanding(pred.distance) {
                    continue;
                }
            }
            if !costing.allowed(edge, Some(pred), &tile, search.time) {
                continue;
            }
            let transition = costing.transition_cost(node, edge, pred);
            let edge_cost = costing.edge_cost(edge, &tile, search.time);
            if !edge_cost.is_valid() || !transition.is_valid() {
                return Err(MatrixError::InvalidCost(edge_id));
            }
            let cost = pred.cost + transition + edge_cost;
            let distance = pred.distance + edge.length_m;

            if status.set == EdgeSet::Temporary {
                let existing = &search.labels[status.label_idx as usize];
                if improves(
                    &cost,
                    distance,
                    edge_id,
                    &existing.cost,
                    existing.distance,
                    existing.edge_id,
                ) {
                    let old_cost = existing.cost.cost;
                    search.queue.decrease(status.label_idx, old_cost, cost.cost);
                    let existing = &mut search.labels[status.label_idx as usize];
                    existing.pred_idx = pred_idx;
                    existing.cost = cost;
                    existing.distance = distance;
                    existing.transition_cost = transition;
                }
                continue;
            }

            if search.labels.len() >= max_labels {
                return Err(MatrixError::ResourceExhaustion {
                    count: search.labels.len(),
                    cap: max_labels,
                });
            }
            let opp_edge_id = reader.opposing_edge_id(&edge_id)?;
            let label_idx = search.labels.len() as u32;
            search.labels.push(EdgeLabel {
                pred_idx,
                edge_id,
                opp_edge_id,
                end_node: edge.end_node,
                cost,
                distance,
                level,
                not_thru: edge.not_thru,
                deadend: edge.deadend,
                transition_cost: transition,
            });
            search.queue.add(label_idx, cost.cost);
            search.edge_status.set_temporary(edge_id, label_idx);
        }
        Ok(())
    }

    /// relax outgoing edges for a reverse search. the tree grows along
    /// opposing-orientation edges, so costs come from the forward twins a
    /// real traveler would drive, via the reverse costing analogs.
    fn expand_reverse(
        &mut self,
        target: usize,
        pred_idx: u32,
        pred: &EdgeLabel,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        let tile = reader.get_tile(&pred.end_node)?;
        let node = tile.node(&pred.end_node)?;
        let max_labels = self.config.max_label_count;
        let search = &mut self.reverse[target];

        for edge_id in tile.node_edge_ids(node) {
            if edge_id == pred.opp_edge_id && !pred.deadend {
                continue;
            }
            let status = search.edge_status.get(&edge_id);
            if status.set == EdgeSet::Permanent {
                continue;
            }
            let edge = tile.directed_edge(&edge_id)?;
            if edge.not_thru && !pred.not_thru {
                continue;
            }
            let level = edge_id.level();
            if level < pred.level {
                if let Some(limits) = search.hierarchy_limits.get_mut(pred.level as usize) {
                    limits.up_transition_count += 1;
                }
            }
            if let Some(limits) = search.hierarchy_limits.get(level as usize) {
                if limits.stop_expanding(pred.distance) {
                    continue;
                }
            }
            let opp_edge_id = reader.opposing_edge_id(&edge_id)?;
            let opp_tile = reader.get_tile(&opp_edge_id)?;
            let opp_edge = opp_tile.directed_edge(&opp_edge_id)?;
            if !costing.allowed_reverse(edge, opp_edge, Some(pred), &tile, search.time) {
                continue;
            }
            let transition = costing.transition_cost_reverse(node, edge, pred);
            let edge_cost = costing.edge_cost_reverse(opp_edge, &opp_tile, search.time);
            if !edge_cost.is_valid() || !transition.is_valid() {
                return Err(MatrixError::InvalidCost(edge_id));
            }
            let cost = pred.cost + transition + edge_cost;
            let distance = pred.distance + edge.length_m;

            if status.set == EdgeSet::Temporary {
                let existing = &search.labels[status.label_idx as usize];
                if improves(
                    &cost,
                    distance,
                    edge_id,
                    &existing.cost,
                    existing.distance,
                    existing.edge_id,
                ) {
                    let old_cost = existing.cost.cost;
                    search.queue.decrease(status.label_idx, old_cost, cost.cost);
                    let existing = &mut search.labels[status.label_idx as usize];
                    existing.pred_idx = pred_idx;
                    existing.cost = cost;
                    existing.distance = distance;
                    existing.transition_cost = transition;
                }
                continue;
            }

            if search.labels.len() >= max_labels {
                return Err(MatrixError::ResourceExhaustion {
                    count: search.labels.len(),
                    cap: max_labels,
                });
            }
            let label_idx = search.labels.len() as u32;
            search.labels.push(EdgeLabel {
                pred_idx,
                edge_id,
                opp_edge_id,
                end_node: edge.end_node,
                cost,
                distance,
                level,
                not_thru: edge.not_thru,
                deadend: edge.deadend,
                transition_cost: transition,
            });
            search.queue.add(label_idx, cost.cost);
            search.edge_status.set_temporary(edge_id, label_idx);
        }
        Ok(())
    }

    /// a pair has met for the first time: it is no longer outstanding for
    /// either of its locations, and each location gets a fresh iteration
    /// window to look for cheaper meetings
    fn update_status(&mut self, source: usize, target: usize) {
        let window = self.config.pair_meeting_threshold;
        let status = &mut self.source_status[source];
        status.remaining.remove(&(target as u32));
        if status.threshold > 0 {
            status.threshold = window;
        }
        let status = &mut self.target_status[target];
        status.remaining.remove(&(source as u32));
        if status.threshold > 0 {
            status.threshold = window;
        }
    }

    fn terminate_source(&mut self, source: usize) {
        let status = &mut self.source_status[source];
        if status.threshold > 0 {
            status.threshold = 0;
            self.remaining_sources -= 1;
        }
    }

    fn terminate_target(&mut self, target: usize) {
        let status = &mut self.target_status[target];
        if status.threshold > 0 {
            status.threshold = 0;
            self.remaining_targets -= 1;
        }
    }

    fn build_result(&self, _request: &MatrixRequest, cancelled: bool) -> MatrixResult {
        let mut cells = Vec::with_capacity(self.best_connection.len());
        for source in 0..self.source_count {
            let depart = self.forward[source].time;
            for target in 0..self.target_count {
                let conn = &self.best_connection[source * self.target_count + target];
                if conn.found {
                    let elapsed = conn.cost.secs.round() as u64;
                    // a source date_time anchors departure; failing that,
                    // a target date_time anchors arrival
                    let (begin, end, anchor) = match (depart, self.reverse[target].time) {
                        (Some(d), _) => (Some(d), Some(d + elapsed), Some(d)),
                        (None, Some(a)) => (Some(a.saturating_sub(elapsed)), Some(a), Some(a)),
                        (None, None) => (None, None, None),
                    };
                    cells.push(MatrixCell {
                        found: true,
                        cost: conn.cost.cost,
                        seconds: conn.cost.secs,
                        distance_meters: conn.distance,
                        begin_epoch_seconds: begin,
                        end_epoch_seconds: end,
                        date_time_epoch_seconds: anchor,
                    });
                } else {
                    cells.push(MatrixCell::default());
                }
            }
        }
        MatrixResult {
            cells,
            source_count: self.source_count,
            target_count: self.target_count,
            cancelled,
            edges_settled: self.edges_settled,
        }
    }
}

fn parse_location_time(
    location: &MatrixLocation,
    has_time: bool,
) -> Result<Option<u64>, MatrixError> {
    if !has_time {
        return Ok(None);
    }
    match &location.date_time {
        None => Ok(None),
        Some(dt) => date_time::parse_epoch_seconds(dt)
            .map(Some)
            .map_err(|e| MatrixError::BuildError(format!("invalid date_time '{}': {}", dt, e))),
    }
}

/// push a seed label, or fold it into an existing temporary label for the
/// same edge when a location has several candidates there. returns the
/// label index the seed ended up under.
fn relax_seed(search: &mut LocationSearch, seed: EdgeLabel) -> u32 {
    let status = search.edge_status.get(&seed.edge_id);
    if status.set == EdgeSet::Temporary {
        let existing = &search.labels[status.label_idx as usize];
        if improves(
            &seed.cost,
            seed.distance,
            seed.edge_id,
            &existing.cost,
            existing.distance,
            existing.edge_id,
        ) {
            let old_cost = existing.cost.cost;
            search
                .queue
                .decrease(status.label_idx, old_cost, seed.cost.cost);
            let existing = &mut search.labels[status.label_idx as usize];
            existing.cost = seed.cost;
            existing.distance = seed.distance;
        }
        return status.label_idx;
    }
    let label_idx = search.labels.len() as u32;
    let edge_id = seed.edge_id;
    let cost = seed.cost.cost;
    search.labels.push(seed);
    search.queue.add(label_idx, cost);
    search.edge_status.set_temporary(edge_id, label_idx);
    label_idx
}

/// candidate ordering: lower cost wins, ties broken by shorter distance,
/// then by lower edge identifier
pub(crate) fn improves(
    new_cost: &Cost,
    new_distance: f64,
    new_edge: GraphId,
    old_cost: &Cost,
    old_distance: f64,
    old_edge: GraphId,
) -> bool {
    match OrderedFloat(new_cost.cost).cmp(&OrderedFloat(old_cost.cost)) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => match OrderedFloat(new_distance).cmp(&OrderedFloat(old_distance)) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => new_edge < old_edge,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::costing::{HierarchyLimits, TravelMode};
    use crate::model::matrix::MatrixLocation;
    use crate::model::network::GraphId;
    use crate::testing::{
        all_modes_table, sources_at, targets_at, NetworkBuilder, TestNetwork, TimeScaledCost,
        UnitCost,
    };
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    /// roomy enough that unit-cost test paths never hit the cost ceiling
    const WIDE_OPEN: f64 = 1_000_000.0;

    fn run(net: &TestNetwork, request: &MatrixRequest) -> MatrixResult {
        run_with(net, request, Arc::new(UnitCost::new()), CostMatrix::default())
    }

    fn run_with(
        net: &TestNetwork,
        request: &MatrixRequest,
        costing: Arc<dyn DynamicCost>,
        mut engine: CostMatrix,
    ) -> MatrixResult {
        let table = all_modes_table(costing);
        engine
            .source_to_target(request, &net.reader, &table, None)
            .unwrap()
    }

    fn exhaustive_engine() -> CostMatrix {
        // a wide supersede window keeps every search running until its
        // queue drains, which makes small-graph results exact
        let config = crate::config::MatrixConfig {
            pair_meeting_threshold: 10_000,
            ..Default::default()
        };
        CostMatrix::new(config).unwrap()
    }

    fn grid_2x2() -> (TestNetwork, usize, usize, usize, usize) {
        let mut b = NetworkBuilder::new();
        let nw = b.add_node();
        let ne = b.add_node();
        let sw = b.add_node();
        let se = b.add_node();
        b.add_road(nw, ne, 1.0)
            .add_road(nw, sw, 1.0)
            .add_road(ne, se, 1.0)
            .add_road(sw, se, 1.0);
        (b.build(), nw, ne, sw, se)
    }

    /// a w×h lattice of 100 m streets; returns the network and node ids
    fn lattice(w: usize, h: usize) -> (TestNetwork, Vec<usize>) {
        let mut b = NetworkBuilder::new();
        let nodes: Vec<usize> = (0..w * h).map(|_| b.add_node()).collect();
        for y in 0..h {
            for x in 0..w {
                if x + 1 < w {
                    b.add_road(nodes[y * w + x], nodes[y * w + x + 1], 100.0);
                }
                if y + 1 < h {
                    b.add_road(nodes[y * w + x], nodes[(y + 1) * w + x], 100.0);
                }
            }
        }
        (b.build(), nodes)
    }

    #[test]
    fn test_self_pair_is_zero() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        b.add_road(a, c, 100.0);
        let net = b.build();

        let loc = net.location_on_edge(a, c, 0.5);
        let request = MatrixRequest::new(
            vec![loc.clone()],
            vec![loc],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let result = run(&net, &request);

        let cell = result.get(0, 0);
        assert!(cell.found);
        assert_eq!(cell.cost, 0.0);
        assert_eq!(cell.seconds, 0.0);
        assert_eq!(cell.distance_meters, 0.0);
    }

    #[test]
    fn test_disconnected_pair_is_not_found() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        let d = b.add_node();
        let e = b.add_node();
        b.add_road(a, c, 100.0).add_road(d, e, 100.0);
        let net = b.build();

        let request = MatrixRequest::new(
            vec![net.source_at_node(a)],
            vec![net.target_at_node(e)],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let result = run(&net, &request);

        let cell = result.get(0, 0);
        assert!(!cell.found);
        assert_eq!(cell.cost, 0.0);
        assert_eq!(cell.distance_meters, 0.0);
    }

    #[test]
    fn test_two_by_two_grid() {
        let (net, nw, ne, sw, se) = grid_2x2();
        let request = MatrixRequest::new(
            sources_at(&net, &[nw, ne]),
            targets_at(&net, &[sw, se]),
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let result = run(&net, &request);

        let expected = [[1.0, 2.0], [2.0, 1.0]];
        for (s, row) in expected.iter().enumerate() {
            for (t, &cost) in row.iter().enumerate() {
                let cell = result.get(s, t);
                assert!(cell.found, "pair ({}, {}) not found", s, t);
                assert_eq!(cell.cost, cost, "pair ({}, {})", s, t);
                assert_eq!(cell.distance_meters, cost, "pair ({}, {})", s, t);
            }
        }
    }

    #[test]
    fn test_cost_ceiling_bounds_unreachable_pair() {
        let mut b = NetworkBuilder::new();
        let nodes: Vec<usize> = (0..11).map(|_| b.add_node()).collect();
        for pair in nodes.windows(2) {
            b.add_road(pair[0], pair[1], 100.0);
        }
        let net = b.build();

        // ceiling = 560 / 56 = 10 cost units, but even the seed edge
        // costs 100: the searches stop before settling anything
        let request = MatrixRequest::new(
            vec![net.source_at_node(nodes[0])],
            vec![net.target_at_node(nodes[10])],
            TravelMode::Auto,
            560.0,
        );
        let result = run(&net, &request);

        assert!(!result.get(0, 0).found);
        assert_eq!(result.edges_settled, 0);
    }

    #[test]
    fn test_time_variant_recosting() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        let d = b.add_node();
        let e = b.add_node();
        b.add_road(a, c, 50.0).add_road(c, d, 50.0).add_road(d, e, 50.0);
        let net = b.build();

        let mut source = net.source_at_node(a);
        source.date_time = Some("1970-01-01T00:00".to_string());
        let mut request = MatrixRequest::new(
            vec![source],
            vec![net.target_at_node(e)],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        request.has_time = true;

        let costing = Arc::new(TimeScaledCost {
            cutoff_epoch: 100,
            factor: 2.0,
        });

        // the third edge is entered at t = 100, when costs have doubled
        let result = run_with(&net, &request, costing.clone(), CostMatrix::default());
        let cell = result.get(0, 0);
        assert!(cell.found);
        assert_eq!(cell.seconds, 200.0);
        assert_eq!(cell.cost, 200.0);
        assert_eq!(cell.begin_epoch_seconds, Some(0));
        assert_eq!(cell.end_epoch_seconds, Some(200));
        assert_eq!(cell.date_time_epoch_seconds, Some(0));

        // invariant time keeps the departure-time snapshot
        request.invariant = true;
        let result = run_with(&net, &request, costing, CostMatrix::default());
        assert_eq!(result.get(0, 0).seconds, 150.0);
    }

    #[test]
    fn test_arrival_anchored_times() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        let d = b.add_node();
        let e = b.add_node();
        b.add_road(a, c, 50.0).add_road(c, d, 50.0).add_road(d, e, 50.0);
        let net = b.build();

        // only the target carries a date_time: the pair is anchored on
        // arrival and departure is back-computed
        let mut target = net.target_at_node(e);
        target.date_time = Some("1970-01-01T00:10".to_string());
        let mut request = MatrixRequest::new(
            vec![net.source_at_node(a)],
            vec![target],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        request.has_time = true;

        let result = run(&net, &request);
        let cell = result.get(0, 0);
        assert!(cell.found);
        assert_eq!(cell.seconds, 150.0);
        assert_eq!(cell.end_epoch_seconds, Some(600));
        assert_eq!(cell.begin_epoch_seconds, Some(450));
        assert_eq!(cell.date_time_epoch_seconds, Some(600));
    }

    #[test]
    fn test_many_to_many_settles_less_than_pairwise() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (net, nodes) = lattice(5, 5);
        let sources: Vec<usize> = nodes[..10].to_vec();
        let targets: Vec<usize> = nodes[15..].to_vec();

        let request = MatrixRequest::new(
            sources_at(&net, &sources),
            targets_at(&net, &targets),
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let matrix = run(&net, &request);
        for s in 0..10 {
            for t in 0..10 {
                assert!(matrix.get(s, t).found);
            }
        }

        let mut pairwise_settled = 0u64;
        for &s in &sources {
            for &t in &targets {
                let single = MatrixRequest::new(
                    vec![net.source_at_node(s)],
                    vec![net.target_at_node(t)],
                    TravelMode::Auto,
                    WIDE_OPEN,
                );
                pairwise_settled += run(&net, &single).edges_settled;
            }
        }
        assert!(
            matrix.edges_settled < pairwise_settled,
            "matrix settled {} edges, pairwise total {}",
            matrix.edges_settled,
            pairwise_settled
        );
    }

    /// one-to-one edge-based Dijkstra over the same reader and costing,
    /// written against an independent queue implementation
    fn reference_cost(
        net: &TestNetwork,
        costing: &dyn DynamicCost,
        source_node: usize,
        target_node: usize,
    ) -> Option<f64> {
        use priority_queue::PriorityQueue;
        use std::cmp::Reverse;

        let reader = &net.reader;
        let mut best: HashMap<GraphId, EdgeLabel> = HashMap::new();
        let mut settled: HashSet<GraphId> = HashSet::new();
        let mut queue: PriorityQueue<GraphId, Reverse<OrderedFloat<f64>>> = PriorityQueue::new();

        for cand in &net.source_at_node(source_node).edges {
            let tile = reader.get_tile(&cand.edge_id).unwrap();
            let edge = tile.directed_edge(&cand.edge_id).unwrap();
            if !costing.allowed(edge, None, &tile, None) {
                continue;
            }
            let cost = costing.edge_cost(edge, &tile, None);
            best.insert(
                cand.edge_id,
                EdgeLabel {
                    pred_idx: INVALID_LABEL,
                    edge_id: cand.edge_id,
                    opp_edge_id: reader.opposing_edge_id(&cand.edge_id).unwrap(),
                    end_node: edge.end_node,
                    cost,
                    distance: edge.length_m,
                    level: cand.edge_id.level(),
                    not_thru: edge.not_thru,
                    deadend: edge.deadend,
                    transition_cost: Cost::ZERO,
                },
            );
            queue.push(cand.edge_id, Reverse(OrderedFloat(cost.cost)));
        }

        while let Some((edge_id, _)) = queue.pop() {
            if !settled.insert(edge_id) {
                continue;
            }
            let pred = best[&edge_id].clone();
            let tile = reader.get_tile(&pred.end_node).unwrap();
            let node = tile.node(&pred.end_node).unwrap();
            for next_id in tile.node_edge_ids(node) {
                if next_id == pred.opp_edge_id && !pred.deadend {
                    continue;
                }
                if settled.contains(&next_id) {
                    continue;
                }
                let edge = tile.directed_edge(&next_id).unwrap();
                if !costing.allowed(edge, Some(&pred), &tile, None) {
                    continue;
                }
                let cost = pred.cost
                    + costing.transition_cost(node, edge, &pred)
                    + costing.edge_cost(edge, &tile, None);
                let improved = best
                    .get(&next_id)
                    .map(|l| cost.cost < l.cost.cost)
                    .unwrap_or(true);
                if improved {
                    best.insert(
                        next_id,
                        EdgeLabel {
                            pred_idx: 0,
                            edge_id: next_id,
                            opp_edge_id: reader.opposing_edge_id(&next_id).unwrap(),
                            end_node: edge.end_node,
                            cost,
                            distance: pred.distance + edge.length_m,
                            level: next_id.level(),
                            not_thru: edge.not_thru,
                            deadend: edge.deadend,
                            transition_cost: Cost::ZERO,
                        },
                    );
                    queue.push_increase(next_id, Reverse(OrderedFloat(cost.cost)));
                }
            }
        }

        net.target_at_node(target_node)
            .edges
            .iter()
            .filter(|c| settled.contains(&c.edge_id))
            .map(|c| OrderedFloat(best[&c.edge_id].cost.cost))
            .min()
            .map(|c| c.0)
    }

    #[test]
    fn test_static_costs_match_reference_dijkstra() {
        // lattice with varied integer lengths so bucket quantization
        // cannot blur distinct costs
        let mut b = NetworkBuilder::new();
        let nodes: Vec<usize> = (0..16).map(|_| b.add_node()).collect();
        let mut k = 0u64;
        for y in 0..4 {
            for x in 0..4 {
                if x + 1 < 4 {
                    b.add_road(nodes[y * 4 + x], nodes[y * 4 + x + 1], 100.0 + (k % 7) as f64 * 10.0);
                    k += 1;
                }
                if y + 1 < 4 {
                    b.add_road(nodes[y * 4 + x], nodes[(y + 1) * 4 + x], 100.0 + (k % 5) as f64 * 10.0);
                    k += 1;
                }
            }
        }
        let net = b.build();

        let sources = [nodes[0], nodes[5], nodes[10]];
        let targets = [nodes[3], nodes[12], nodes[15]];
        let request = MatrixRequest::new(
            sources_at(&net, &sources),
            targets_at(&net, &targets),
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let costing = UnitCost::new();
        let result = run_with(&net, &request, Arc::new(UnitCost::new()), exhaustive_engine());

        for (s, &source) in sources.iter().enumerate() {
            for (t, &target) in targets.iter().enumerate() {
                let expected = reference_cost(&net, &costing, source, target);
                let cell = result.get(s, t);
                match expected {
                    None => assert!(!cell.found, "pair ({}, {})", s, t),
                    Some(cost) => {
                        assert!(cell.found, "pair ({}, {})", s, t);
                        assert_eq!(cell.cost, cost, "pair ({}, {})", s, t);
                    }
                }
            }
        }
    }

    #[test]
    fn test_symmetry_on_undirected_grid() {
        let (net, nodes) = lattice(3, 3);
        let picks = [nodes[0], nodes[4], nodes[8]];
        let request = MatrixRequest::new(
            sources_at(&net, &picks),
            targets_at(&net, &picks),
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let result = run_with(&net, &request, Arc::new(UnitCost::new()), exhaustive_engine());
        for s in 0..picks.len() {
            for t in 0..picks.len() {
                assert_eq!(
                    result.get(s, t).cost,
                    result.get(t, s).cost,
                    "asymmetric pair ({}, {})",
                    s,
                    t
                );
            }
        }
    }

    #[test]
    fn test_raising_max_distance_never_worsens_cost() {
        let mut b = NetworkBuilder::new();
        let nodes: Vec<usize> = (0..5).map(|_| b.add_node()).collect();
        for pair in nodes.windows(2) {
            b.add_road(pair[0], pair[1], 100.0);
        }
        let net = b.build();

        let mut previous: Option<f64> = None;
        for max_distance in [5_600.0, 22_400.0, 44_800.0] {
            let request = MatrixRequest::new(
                vec![net.source_at_node(nodes[0])],
                vec![net.target_at_node(nodes[4])],
                TravelMode::Auto,
                max_distance,
            );
            let cell_cost = {
                let result = run(&net, &request);
                let cell = result.get(0, 0);
                cell.found.then_some(cell.cost)
            };
            if let Some(prev) = previous {
                let current = cell_cost.expect("found pair disappeared at larger max distance");
                assert!(current <= prev);
            }
            previous = previous.or(cell_cost);
        }
        assert_eq!(previous, Some(400.0));
    }

    #[test]
    fn test_identical_queries_are_idempotent() {
        let (net, nodes) = lattice(4, 3);
        let request = MatrixRequest::new(
            sources_at(&net, &nodes[..3]),
            targets_at(&net, &nodes[9..]),
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let first = run(&net, &request);
        // same engine instance reused after clear
        let mut engine = CostMatrix::default();
        let table = all_modes_table(Arc::new(UnitCost::new()));
        let second = engine
            .source_to_target(&request, &net.reader, &table, None)
            .unwrap();
        let third = engine
            .source_to_target(&request, &net.reader, &table, None)
            .unwrap();
        assert_eq!(first.cells, second.cells);
        assert_eq!(second.cells, third.cells);
    }

    #[cfg(feature = "sync-tiles")]
    #[test]
    fn test_idempotent_across_threads() {
        use rayon::prelude::*;
        let (net, nodes) = lattice(4, 4);
        let request = MatrixRequest::new(
            sources_at(&net, &nodes[..4]),
            targets_at(&net, &nodes[12..]),
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let serial = run(&net, &request);
        let parallel: Vec<MatrixResult> = (0..4)
            .into_par_iter()
            .map(|_| {
                let table = all_modes_table(Arc::new(UnitCost::new()));
                let mut engine = CostMatrix::default();
                engine
                    .source_to_target(&request, &net.reader, &table, None)
                    .unwrap()
            })
            .collect();
        for result in parallel {
            assert_eq!(result.cells, serial.cells);
        }
    }

    #[test]
    fn test_cancellation_returns_partial_matrix() {
        let (net, nodes) = lattice(3, 3);
        let request = MatrixRequest::new(
            vec![net.source_at_node(nodes[0])],
            vec![net.target_at_node(nodes[8])],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let mut engine = CostMatrix::default();
        let table = all_modes_table(Arc::new(UnitCost::new()));
        let cancel: &dyn Fn() -> bool = &|| true;
        let result = engine
            .source_to_target(&request, &net.reader, &table, Some(cancel))
            .unwrap();
        assert!(result.cancelled);
        assert!(!result.get(0, 0).found);
    }

    #[test]
    fn test_location_without_candidates_yields_empty_row() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        b.add_road(a, c, 100.0);
        let net = b.build();

        let request = MatrixRequest::new(
            vec![MatrixLocation::new(vec![]), net.source_at_node(a)],
            vec![net.target_at_node(c)],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let result = run(&net, &request);
        assert!(!result.get(0, 0).found);
        assert!(result.get(1, 0).found);
        assert_eq!(result.get(1, 0).cost, 100.0);
    }

    #[test]
    fn test_partial_edge_pair_costs_the_span_between() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        b.add_road(a, c, 100.0);
        let net = b.build();

        let request = MatrixRequest::new(
            vec![net.location_on_edge(a, c, 0.25)],
            vec![net.location_on_edge(a, c, 0.75)],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let result = run(&net, &request);
        let cell = result.get(0, 0);
        assert!(cell.found);
        assert_eq!(cell.cost, 50.0);
        assert_eq!(cell.distance_meters, 50.0);
    }

    #[test]
    fn test_uturn_allowed_only_at_dead_end() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        let d = b.add_node();
        b.add_road(a, c, 100.0).add_road(c, d, 50.0);
        let net = b.build();

        // start into the spur towards the dead end at d, finish at a:
        // the only way back is the u-turn at d
        let request = MatrixRequest::new(
            vec![net.location_on_edge(c, d, 0.0)],
            vec![net.target_at_node(a)],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let result = run_with(&net, &request, Arc::new(UnitCost::new()), exhaustive_engine());
        let cell = result.get(0, 0);
        assert!(cell.found);
        assert_eq!(cell.cost, 200.0);
    }

    #[test]
    fn test_not_thru_region_is_not_entered() {
        let mut b = NetworkBuilder::new();
        let s = b.add_node();
        let a = b.add_node();
        let m = b.add_node();
        let c = b.add_node();
        let t = b.add_node();
        b.add_road(s, a, 100.0)
            .add_road(a, m, 50.0)
            .add_road(m, c, 50.0)
            .add_road(a, c, 300.0)
            .add_road(c, t, 100.0)
            .mark_not_thru(a, m)
            .mark_not_thru(c, m);
        let net = b.build();

        let request = MatrixRequest::new(
            vec![net.source_at_node(s)],
            vec![net.target_at_node(t)],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let result = run_with(&net, &request, Arc::new(UnitCost::new()), exhaustive_engine());
        let cell = result.get(0, 0);
        assert!(cell.found);
        // the shortcut through m would be 300; through traffic may not
        // take it
        assert_eq!(cell.cost, 500.0);
    }

    #[test]
    fn test_hierarchy_limits_prune_far_local_roads() {
        // local tails on both ends, a local link in the middle that
        // neither frontier may expand once it has climbed to the highway
        // level and traveled beyond the local radius
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let h1 = b.add_node_on_level(0);
        let h2 = b.add_node_on_level(0);
        let d1 = b.add_node();
        let d2 = b.add_node();
        let h3 = b.add_node_on_level(0);
        let h4 = b.add_node_on_level(0);
        let e = b.add_node();
        b.add_road(a, h1, 100.0)
            .add_road(h1, h2, 100.0)
            .add_road(h2, d1, 100.0)
            .add_road(d1, d2, 100.0)
            .add_road(d2, h3, 100.0)
            .add_road(h3, h4, 100.0)
            .add_road(h4, e, 100.0);
        let net = b.build();

        let restrictive = vec![
            HierarchyLimits::unrestricted(),
            HierarchyLimits::unrestricted(),
            HierarchyLimits::new(0, 50.0),
        ];
        let request = MatrixRequest::new(
            vec![net.source_at_node(a)],
            vec![net.target_at_node(e)],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let pruned = run_with(
            &net,
            &request,
            Arc::new(UnitCost::with_hierarchy_limits(restrictive)),
            exhaustive_engine(),
        );
        assert!(!pruned.get(0, 0).found);

        let open = run_with(&net, &request, Arc::new(UnitCost::new()), exhaustive_engine());
        assert!(open.get(0, 0).found);
        assert_eq!(open.get(0, 0).cost, 700.0);
    }

    #[test]
    fn test_label_hard_cap_is_fatal() {
        let (net, nodes) = lattice(3, 3);
        let config = crate::config::MatrixConfig {
            max_label_count: 4,
            max_reserved_labels_count: 4,
            ..Default::default()
        };
        let mut engine = CostMatrix::new(config).unwrap();
        let table = all_modes_table(Arc::new(UnitCost::new()));
        let request = MatrixRequest::new(
            vec![net.source_at_node(nodes[4])],
            vec![net.target_at_node(nodes[0])],
            TravelMode::Auto,
            WIDE_OPEN,
        );
        let err = engine
            .source_to_target(&request, &net.reader, &table, None)
            .unwrap_err();
        assert!(matches!(err, MatrixError::ResourceExhaustion { .. }));
    }

    #[test]
    fn test_empty_request_yields_empty_matrix() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        b.add_road(a, c, 100.0);
        let net = b.build();
        let request =
            MatrixRequest::new(vec![], vec![net.target_at_node(c)], TravelMode::Auto, WIDE_OPEN);
        let result = run(&net, &request);
        assert!(result.cells.is_empty());
    }

    #[test]
    fn test_invalid_max_distance_is_a_build_error() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        b.add_road(a, c, 100.0);
        let net = b.build();
        let request =
            MatrixRequest::new(vec![net.source_at_node(a)], vec![net.target_at_node(c)], TravelMode::Auto, 0.0);
        let mut engine = CostMatrix::default();
        let table = all_modes_table(Arc::new(UnitCost::new()));
        let err = engine
            .source_to_target(&request, &net.reader, &table, None)
            .unwrap_err();
        assert!(matches!(err, MatrixError::BuildError(_)));
    }
}
