mod cost;

pub use cost::Cost;
