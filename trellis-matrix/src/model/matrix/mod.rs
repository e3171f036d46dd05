pub mod date_time;
mod location;
mod request;
mod result;

pub use location::{CandidateEdge, MatrixLocation};
pub use request::MatrixRequest;
pub use result::{MatrixCell, MatrixResult};
