use super::cost_matrix::CostMatrix;
use super::edge_label::{EdgeLabel, INVALID_LABEL};
use super::matrix_error::MatrixError;
use crate::model::costing::DynamicCost;
use crate::model::matrix::MatrixRequest;
use crate::model::network::{GraphId, GraphReader};
use crate::model::unit::Cost;
use std::sync::Arc;

/// Time-aware recosting. The search ran against a costing snapshot taken
/// at each location's departure time, which misestimates edges whose cost
/// varies with time of day. This pass reconstructs the meeting path of
/// every found pair and re-evaluates each edge with the timestamp at
/// which a traveler actually reaches it, replacing the connection cost.
impl CostMatrix {
    pub(crate) fn recost_paths(
        &mut self,
        request: &MatrixRequest,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<(), MatrixError> {
        for source in 0..self.source_count {
            let depart = match self.forward[source].time {
                Some(depart) => depart,
                None => continue,
            };
            for target in 0..self.target_count {
                let idx = source * self.target_count + target;
                if !self.best_connection[idx].found {
                    continue;
                }
                let path = self.form_path(source, target, idx)?;
                if path.is_empty() {
                    continue;
                }
                let recosted =
                    self.recost_path(&path, depart, source, target, request, reader, costing)?;
                self.best_connection[idx].cost = recosted;
            }
        }
        Ok(())
    }

    /// stitch the meeting path back together: the forward predecessor
    /// chain down to the meeting edge, then the reverse chain's opposing
    /// edges out to the target. the meeting edge appears once.
    fn form_path(
        &self,
        source: usize,
        target: usize,
        idx: usize,
    ) -> Result<Vec<GraphId>, MatrixError> {
        let conn = &self.best_connection[idx];
        if conn.trivial {
            return Ok(vec![conn.edge_id]);
        }
        let forward = &self.forward[source];
        let info = forward.edge_status.get(&conn.edge_id);
        if info.label_idx == INVALID_LABEL {
            return Err(MatrixError::InternalError(format!(
                "meeting edge {} missing from forward search {}",
                conn.edge_id, source
            )));
        }
        let mut path = Vec::new();
        let mut i = info.label_idx;
        while i != INVALID_LABEL {
            let label = &forward.labels[i as usize];
            path.push(label.edge_id);
            i = label.pred_idx;
        }
        path.reverse();

        let reverse = &self.reverse[target];
        let info = reverse.edge_status.get(&conn.opp_edge_id);
        if info.label_idx == INVALID_LABEL {
            return Err(MatrixError::InternalError(format!(
                "meeting edge {} missing from reverse search {}",
                conn.opp_edge_id, target
            )));
        }
        let mut i = reverse.labels[info.label_idx as usize].pred_idx;
        while i != INVALID_LABEL {
            let label = &reverse.labels[i as usize];
            path.push(label.opp_edge_id);
            i = label.pred_idx;
        }
        Ok(path)
    }

    /// walk the edge list with real timestamps, scaling the first and
    /// last edges by the locations' positions along them
    #[allow(clippy::too_many_arguments)]
    fn recost_path(
        &self,
        path: &[GraphId],
        depart: u64,
        source: usize,
        target: usize,
        request: &MatrixRequest,
        reader: &GraphReader,
        costing: &Arc<dyn DynamicCost>,
    ) -> Result<Cost, MatrixError> {
        let mut total = Cost::ZERO;
        let mut prev: Option<EdgeLabel> = None;
        let last = path.len() - 1;

        for (k, edge_id) in path.iter().enumerate() {
            let tile = reader.get_tile(edge_id)?;
            let edge = tile.directed_edge(edge_id)?;
            let timestamp = Some(depart + total.secs.round() as u64);

            let transition = match &prev {
                Some(p) => {
                    let node = tile.node(&p.end_node)?;
                    costing.transition_cost(node, edge, p)
                }
                None => Cost::ZERO,
            };

            let mut portion = 1.0;
            if k == 0 {
                if let Some(pct) = request.sources[source].percent_along(edge_id) {
                    portion -= pct;
                }
            }
            if k == last {
                if let Some(pct) = request.targets[target].percent_along(edge_id) {
                    portion -= 1.0 - pct;
                }
            }
            let edge_cost = costing.edge_cost(edge, &tile, timestamp) * portion.max(0.0);
            if !edge_cost.is_valid() || !transition.is_valid() {
                return Err(MatrixError::InvalidCost(*edge_id));
            }
            total = total + transition + edge_cost;

            prev = Some(EdgeLabel {
                pred_idx: INVALID_LABEL,
                edge_id: *edge_id,
                opp_edge_id: reader.opposing_edge_id(edge_id)?,
                end_node: edge.end_node,
                cost: total,
                distance: 0.0,
                level: edge_id.level(),
                not_thru: edge.not_thru,
                deadend: edge.deadend,
                transition_cost: transition,
            });
        }
        Ok(total)
    }
}
