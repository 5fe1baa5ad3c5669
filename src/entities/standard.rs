//! Product standard entity - per-machine nominal values and tolerances

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::ValidationError;
use crate::core::identity::{ProductId, StandardId, UserId};
use crate::core::tolerance::{Dimension, ToleranceBand};

/// Default number of items measured per cycle for new standards
pub const DEFAULT_QUANTITY_PER_CYCLE: u32 = 18;

/// Tolerance standard for one product on one machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStandard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StandardId>,

    pub product_id: ProductId,

    pub machine_number: String,

    /// Items measured per production record
    pub quantity_per_cycle: u32,

    pub weight: ToleranceBand,

    /// Kept for reference only; height is judged pass/fail by the operator
    #[serde(default)]
    pub height: ToleranceBand,

    pub rim_thickness: ToleranceBand,

    pub load: ToleranceBand,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,

    pub created_at: DateTime<Utc>,
}

impl ProductStandard {
    /// New unsaved standard with all bands zeroed
    pub fn new(
        product_id: ProductId,
        machine_number: impl Into<String>,
        quantity_per_cycle: u32,
        created_by: Option<UserId>,
    ) -> Self {
        Self {
            id: None,
            product_id,
            machine_number: machine_number.into(),
            quantity_per_cycle,
            weight: ToleranceBand::default(),
            height: ToleranceBand::default(),
            rim_thickness: ToleranceBand::default(),
            load: ToleranceBand::default(),
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Tolerance band used to grade a numeric dimension
    ///
    /// Height and visual are operator checks and have no band.
    pub fn band(&self, dimension: Dimension) -> Option<&ToleranceBand> {
        match dimension {
            Dimension::Weight => Some(&self.weight),
            Dimension::RimThickness => Some(&self.rim_thickness),
            Dimension::Load => Some(&self.load),
            Dimension::Height | Dimension::Visual => None,
        }
    }

    /// Check required fields and tolerance sanity
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.machine_number.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "machine number",
            });
        }
        if self.quantity_per_cycle == 0 {
            return Err(ValidationError::InvalidQuantity);
        }
        self.weight.validate(Dimension::Weight)?;
        self.height.validate(Dimension::Height)?;
        self.rim_thickness.validate(Dimension::RimThickness)?;
        self.load.validate(Dimension::Load)?;
        Ok(())
    }
}

impl Entity for ProductStandard {
    type Id = StandardId;
    const KIND: &'static str = "standard";

    fn id(&self) -> Option<StandardId> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> ProductStandard {
        let mut s = ProductStandard::new(ProductId(1), "M-01", 3, None);
        s.weight = ToleranceBand::new(100.0, 2.0, 3.0);
        s.rim_thickness = ToleranceBand::new(1.5, 0.25, 0.25);
        s.load = ToleranceBand::new(40.0, 5.0, 5.0);
        s
    }

    #[test]
    fn test_band_lookup() {
        let s = standard();
        assert_eq!(s.band(Dimension::Weight).unwrap().nominal, 100.0);
        assert_eq!(s.band(Dimension::Load).unwrap().upper(), 45.0);
        assert!(s.band(Dimension::Height).is_none());
        assert!(s.band(Dimension::Visual).is_none());
    }

    #[test]
    fn test_validate_requires_machine_and_quantity() {
        let mut s = standard();
        assert!(s.validate().is_ok());

        s.machine_number = "  ".to_string();
        assert_eq!(
            s.validate().unwrap_err(),
            ValidationError::Required {
                field: "machine number"
            }
        );

        let mut s = standard();
        s.quantity_per_cycle = 0;
        assert_eq!(s.validate().unwrap_err(), ValidationError::InvalidQuantity);
    }
}
