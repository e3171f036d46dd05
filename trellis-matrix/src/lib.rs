//! Many-to-many cost matrix engine of the Trellis routing suite.
//!
//! Given S source and T target locations on a tiled, hierarchical road
//! graph, [`algorithm::costmatrix::CostMatrix`] produces the S×T matrix
//! of best-cost paths using one coordinated bidirectional expansion:
//! forward searches rooted at every source and reverse searches rooted
//! at every target share work by meeting at reached edges, instead of
//! running S·T independent shortest-path queries.
//!
//! Graph tiles, the [`model::network::GraphReader`], and the per-mode
//! [`model::costing::DynamicCost`] evaluation are consumed interfaces;
//! the crate ships an in-memory reader and a free-flow costing so the
//! engine can run and be tested standalone.

pub mod algorithm;
pub mod config;
pub mod model;
pub mod testing;
pub mod util;
