//! Tolerance evaluation
//!
//! A measured value is in spec when it falls inside the closed band
//! `[nominal - minus, nominal + plus]`. Both edges are inclusive.
//!
//! Absent values (`None`) are never in spec. The entry form starts every
//! row with nothing entered, and an unfilled row must not be reported as
//! passing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::ValidationError;

/// Returns true when `measured` lies within `[nominal - minus, nominal + plus]`
///
/// `NaN` in any argument yields false.
pub fn in_spec(measured: f64, nominal: f64, plus: f64, minus: f64) -> bool {
    (nominal - minus) <= measured && measured <= (nominal + plus)
}

/// Nominal value with independent plus/minus tolerances
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToleranceBand {
    /// Target value
    pub nominal: f64,
    /// Allowed deviation above nominal (>= 0)
    pub plus: f64,
    /// Allowed deviation below nominal (>= 0)
    pub minus: f64,
}

impl ToleranceBand {
    pub fn new(nominal: f64, plus: f64, minus: f64) -> Self {
        Self {
            nominal,
            plus,
            minus,
        }
    }

    /// Lowest accepted value
    pub fn lower(&self) -> f64 {
        self.nominal - self.minus
    }

    /// Highest accepted value
    pub fn upper(&self) -> f64 {
        self.nominal + self.plus
    }

    /// Check a measured value against the band
    pub fn contains(&self, measured: f64) -> bool {
        in_spec(measured, self.nominal, self.plus, self.minus)
    }

    /// Check a possibly-missing value; `None` is out of spec
    pub fn accepts(&self, measured: Option<f64>) -> bool {
        measured.is_some_and(|m| self.contains(m))
    }

    /// Reject negative or non-finite tolerances
    pub fn validate(&self, dimension: Dimension) -> Result<(), ValidationError> {
        if !self.nominal.is_finite() || !self.plus.is_finite() || !self.minus.is_finite() {
            return Err(ValidationError::InvalidTolerance {
                dimension: dimension.label(),
                reason: "values must be finite numbers".to_string(),
            });
        }
        if self.plus < 0.0 || self.minus < 0.0 {
            return Err(ValidationError::InvalidTolerance {
                dimension: dimension.label(),
                reason: "tolerances cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ToleranceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+{} / -{})", self.nominal, self.plus, self.minus)
    }
}

/// The checks made on every item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Weight,
    Height,
    RimThickness,
    Load,
    Visual,
}

impl Dimension {
    /// All dimensions in display order
    pub fn all() -> &'static [Dimension] {
        &[
            Dimension::Weight,
            Dimension::Height,
            Dimension::RimThickness,
            Dimension::Load,
            Dimension::Visual,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Weight => "weight",
            Dimension::Height => "height",
            Dimension::RimThickness => "rim thickness",
            Dimension::Load => "load",
            Dimension::Visual => "visual",
        }
    }

    /// Measurement unit shown in column headers
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Dimension::Weight => Some("g"),
            Dimension::RimThickness => Some("mm"),
            Dimension::Load => Some("NM"),
            Dimension::Height | Dimension::Visual => None,
        }
    }

    /// Whether the dimension is measured numerically (vs. a pass/fail check)
    pub fn is_numeric(&self) -> bool {
        self.unit().is_some()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
