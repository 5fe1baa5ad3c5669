//! Measurement entry entity - one item's readings
//!
//! Only raw readings are stored. In-spec flags are derived on read by
//! [`MeasurementEntry::evaluate`] against the record's standard, so they
//! always reflect the standard's current tolerances.

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{MeasurementId, RecordId};
use crate::core::tolerance::Dimension;
use crate::entities::standard::ProductStandard;

/// Readings for one item within a production record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MeasurementId>,

    /// Parent record; assigned when the record is saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,

    /// 1-based position within the record
    pub item_number: u32,

    pub visual_ok: bool,

    pub height_ok: bool,

    /// `None` until entered
    pub weight: Option<f64>,

    pub rim_thickness: Option<f64>,

    pub load: Option<f64>,
}

impl MeasurementEntry {
    /// Blank row; visual and height default to passing as on the entry form
    pub fn blank(item_number: u32) -> Self {
        Self {
            id: None,
            record_id: None,
            item_number,
            visual_ok: true,
            height_ok: true,
            weight: None,
            rim_thickness: None,
            load: None,
        }
    }

    /// Measured value for a numeric dimension
    pub fn value(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Weight => self.weight,
            Dimension::RimThickness => self.rim_thickness,
            Dimension::Load => self.load,
            Dimension::Height | Dimension::Visual => None,
        }
    }

    /// Whether weight, rim thickness and load all hold a positive reading
    ///
    /// Zero is not a plausible reading for any of them, so a stored `0.0`
    /// counts as not entered here even though it is graded numerically.
    pub fn has_data(&self) -> bool {
        [self.weight, self.rim_thickness, self.load]
            .iter()
            .all(|v| v.is_some_and(|v| v > 0.0))
    }

    /// Grade this entry against a standard
    pub fn evaluate(&self, standard: &ProductStandard) -> MeasurementVerdict {
        MeasurementVerdict {
            visual_ok: self.visual_ok,
            weight_in_spec: standard.weight.accepts(self.weight),
            height_ok: self.height_ok,
            rim_thickness_in_spec: standard.rim_thickness.accepts(self.rim_thickness),
            load_in_spec: standard.load.accepts(self.load),
        }
    }
}

impl Entity for MeasurementEntry {
    type Id = MeasurementId;
    const KIND: &'static str = "measurement";

    fn id(&self) -> Option<MeasurementId> {
        self.id
    }
}

/// Pass/fail outcome for every dimension of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementVerdict {
    pub visual_ok: bool,
    pub weight_in_spec: bool,
    pub height_ok: bool,
    pub rim_thickness_in_spec: bool,
    pub load_in_spec: bool,
}

impl MeasurementVerdict {
    pub fn passes(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Weight => self.weight_in_spec,
            Dimension::Height => self.height_ok,
            Dimension::RimThickness => self.rim_thickness_in_spec,
            Dimension::Load => self.load_in_spec,
            Dimension::Visual => self.visual_ok,
        }
    }

    /// True when every dimension passes
    pub fn all_ok(&self) -> bool {
        Dimension::all().iter().all(|d| self.passes(*d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::ProductId;
    use crate::core::tolerance::ToleranceBand;

    fn standard() -> ProductStandard {
        let mut s = ProductStandard::new(ProductId(1), "M-01", 3, None);
        s.weight = ToleranceBand::new(100.0, 2.0, 3.0);
        s.rim_thickness = ToleranceBand::new(2.0, 0.5, 0.5);
        s.load = ToleranceBand::new(40.0, 5.0, 5.0);
        s
    }

    fn entry(weight: f64, rim: f64, load: f64) -> MeasurementEntry {
        MeasurementEntry {
            weight: Some(weight),
            rim_thickness: Some(rim),
            load: Some(load),
            ..MeasurementEntry::blank(1)
        }
    }

    #[test]
    fn test_evaluate_grades_each_dimension() {
        let verdict = entry(96.9, 2.0, 45.0).evaluate(&standard());
        assert!(!verdict.weight_in_spec);
        assert!(verdict.rim_thickness_in_spec);
        assert!(verdict.load_in_spec);
        assert!(verdict.visual_ok);
        assert!(!verdict.all_ok());
    }

    #[test]
    fn test_blank_entry_fails_numeric_checks() {
        let verdict = MeasurementEntry::blank(1).evaluate(&standard());
        assert!(!verdict.weight_in_spec);
        assert!(!verdict.rim_thickness_in_spec);
        assert!(!verdict.load_in_spec);
        assert!(verdict.height_ok);
    }

    #[test]
    fn test_has_data_requires_positive_values() {
        assert!(entry(100.0, 2.0, 40.0).has_data());
        assert!(!entry(0.0, 2.0, 40.0).has_data());
        assert!(!MeasurementEntry::blank(1).has_data());

        let mut partial = entry(100.0, 2.0, 40.0);
        partial.load = None;
        assert!(!partial.has_data());
    }

    #[test]
    fn test_verdict_passes_maps_fields() {
        let mut e = entry(100.0, 2.0, 40.0);
        e.height_ok = false;
        let verdict = e.evaluate(&standard());
        assert!(!verdict.passes(Dimension::Height));
        assert!(verdict.passes(Dimension::Weight));
    }
}
