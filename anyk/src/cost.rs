//! Cost model shared by the graph and every enumerator.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use derive_more::{Add, AddAssign, Sub, SubAssign, Sum};

pub const INF: Cost = Cost(f64::INFINITY);
pub const ZERO: Cost = Cost(0.0);

/// Tolerance used when two different derivations of the same cost are compared.
pub const EPSILON: f64 = 1e-7;

#[derive(Copy, Clone, Debug, Default, PartialOrd, PartialEq, Add, Sub, Sum, AddAssign, SubAssign)]
pub struct Cost(f64);

impl Cost {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Total order over costs, `INF` sorts last.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }

    /// Whether `self` and `other` agree within [`EPSILON`], relative to their magnitude.
    pub fn approx_eq(&self, other: Cost) -> bool {
        if self.0 == other.0 {
            return true;
        }
        if !self.is_finite() || !other.is_finite() {
            return false;
        }
        let scale = self.0.abs().max(other.0.abs()).max(1.0);
        (self.0 - other.0).abs() <= EPSILON * scale
    }

    /// `self <= other` up to the tolerance of [`Cost::approx_eq`].
    pub fn approx_le(&self, other: Cost) -> bool {
        self.0 <= other.0 || self.approx_eq(other)
    }
}

impl From<f64> for Cost {
    fn from(c: f64) -> Self {
        Cost(c)
    }
}

impl From<i32> for Cost {
    fn from(c: i32) -> Self {
        Cost(c as f64)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
