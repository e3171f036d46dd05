use serde::Serialize;

/// one cell of the result matrix. a pair that could not be settled within
/// its thresholds is reported with `found = false` and zeroed values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MatrixCell {
    pub found: bool,
    pub cost: f64,
    pub seconds: f64,
    pub distance_meters: f64,
    /// departure time at the source, when the pair had a time anchor
    pub begin_epoch_seconds: Option<u64>,
    /// arrival time at the target
    pub end_epoch_seconds: Option<u64>,
    /// the parsed `date_time` the pair was anchored to: the source's
    /// departure when present, otherwise the target's arrival
    pub date_time_epoch_seconds: Option<u64>,
}

/// the S×T result of a matrix query, row-major by source
#[derive(Clone, Debug, Default, Serialize)]
pub struct MatrixResult {
    pub cells: Vec<MatrixCell>,
    pub source_count: usize,
    pub target_count: usize,
    /// the query tripped the caller's interruption sentinel; cells hold
    /// whatever connections had been settled at that point
    pub cancelled: bool,
    /// total edges settled across all per-location searches
    pub edges_settled: u64,
}

impl MatrixResult {
    pub fn get(&self, source: usize, target: usize) -> &MatrixCell {
        &self.cells[source * self.target_count + target]
    }

    /// serialize as the service response shape: one row of cell objects
    /// per source
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = (0..self.source_count)
            .map(|s| {
                let row: Vec<serde_json::Value> = (0..self.target_count)
                    .map(|t| serde_json::json!(self.get(s, t)))
                    .collect();
                serde_json::Value::Array(row)
            })
            .collect();
        serde_json::json!({
            "algorithm": "costmatrix",
            "cancelled": self.cancelled,
            "sources_to_targets": rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let result = MatrixResult {
            cells: vec![MatrixCell::default(), MatrixCell::default()],
            source_count: 1,
            target_count: 2,
            cancelled: false,
            edges_settled: 0,
        };
        let json = result.to_json();
        assert_eq!(json["sources_to_targets"].as_array().unwrap().len(), 1);
        assert_eq!(
            json["sources_to_targets"][0].as_array().unwrap().len(),
            2
        );
        assert_eq!(json["sources_to_targets"][0][0]["found"], false);
    }
}
