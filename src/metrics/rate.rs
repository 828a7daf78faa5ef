//! One-decimal rate values.
//!
//! Rates are rounded half away from zero on the `f64` product `value * 10`:
//! `3.05` becomes `3.1` and `0.25` becomes `0.3`, while `1.005` becomes `1.0`
//! because its product is `10.0499…`. A rate always displays with exactly one
//! fractional digit.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A per-second rate rounded to one decimal.
///
/// Division by a zero window or zero reporting hosts yields
/// [`Rate::Undefined`]. It displays as `0.0`, sorts below every defined
/// rate, and drives visual scales to their minimum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Rate {
    Defined(f64),
    #[default]
    Undefined,
}

impl Rate {
    /// Build a rate from an already computed value, rounding it.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Rate::Defined(round1(value))
        } else {
            Rate::Undefined
        }
    }

    /// `numerator / denominator`, rounded.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        Self::new(numerator / denominator)
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Rate::Defined(_))
    }

    /// The rate value, substituting `0.0` when undefined.
    pub fn value(&self) -> f64 {
        self.value_or(0.0)
    }

    pub fn value_or(&self, default: f64) -> f64 {
        match self {
            Rate::Defined(v) => *v,
            Rate::Undefined => default,
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Rate::Undefined, Rate::Undefined) => Some(Ordering::Equal),
            (Rate::Undefined, Rate::Defined(_)) => Some(Ordering::Less),
            (Rate::Defined(_), Rate::Undefined) => Some(Ordering::Greater),
            (Rate::Defined(a), Rate::Defined(b)) => a.partial_cmp(b),
        }
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
