use derive_more::{Add, AddAssign};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Mul;

/// Represents the cost of traversing part of the road network.
/// The `cost` component is the value minimized by the search; `secs` is
/// elapsed travel time, carried alongside so that results can report both.
/// Costs compose by addition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Add, AddAssign, Serialize, Deserialize)]
pub struct Cost {
    pub cost: f64,
    pub secs: f64,
}

impl Cost {
    /// zero cost, unit of the addition operation
    pub const ZERO: Cost = Cost {
        cost: 0.0,
        secs: 0.0,
    };

    /// sentinel used before any path to a pair has been found
    pub const MAX: Cost = Cost {
        cost: f64::MAX,
        secs: f64::MAX,
    };

    pub fn new(cost: f64, secs: f64) -> Cost {
        Cost { cost, secs }
    }

    /// a cost is valid when both components are finite and nonnegative.
    /// costing models that produce NaN or negative values violate the
    /// engine contract and abort the query.
    pub fn is_valid(&self) -> bool {
        self.cost.is_finite() && self.secs.is_finite() && self.cost >= 0.0 && self.secs >= 0.0
    }
}

/// scales both components, used when seeding partial edges by `percent_along`
impl Mul<f64> for Cost {
    type Output = Cost;

    fn mul(self, rhs: f64) -> Cost {
        Cost {
            cost: self.cost * rhs,
            secs: self.secs * rhs,
        }
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}s)", self.cost, self.secs)
    }
}
