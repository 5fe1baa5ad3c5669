//! Production record entity - one measurement session

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{ProductId, RecordId, StandardId, UserId};
use crate::entities::standard::ProductStandard;

/// A batch of items measured for one product on one machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    pub product_id: ProductId,

    pub standard_id: StandardId,

    /// Copied from the standard when the record is started
    pub machine_number: String,

    pub quantity_measured: u32,

    /// Local wall-clock time the record was taken
    pub record_date: NaiveDateTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

impl ProductionRecord {
    /// Start a record against a saved standard
    ///
    /// Returns `None` if the standard has not been saved yet.
    pub fn for_standard(
        standard: &ProductStandard,
        created_by: Option<UserId>,
        record_date: NaiveDateTime,
    ) -> Option<Self> {
        Some(Self {
            id: None,
            product_id: standard.product_id,
            standard_id: standard.id?,
            machine_number: standard.machine_number.clone(),
            quantity_measured: standard.quantity_per_cycle,
            record_date,
            created_by,
        })
    }
}

impl Entity for ProductionRecord {
    type Id = RecordId;
    const KIND: &'static str = "record";

    fn id(&self) -> Option<RecordId> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_for_standard_copies_machine_and_quantity() {
        let mut standard = ProductStandard::new(ProductId(4), "M-07", 12, None);
        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();

        assert!(ProductionRecord::for_standard(&standard, None, date).is_none());

        standard.id = Some(StandardId(9));
        let record = ProductionRecord::for_standard(&standard, Some(UserId(2)), date).unwrap();
        assert_eq!(record.product_id, ProductId(4));
        assert_eq!(record.standard_id, StandardId(9));
        assert_eq!(record.machine_number, "M-07");
        assert_eq!(record.quantity_measured, 12);
        assert_eq!(record.created_by, Some(UserId(2)));
        assert!(record.is_new());
    }
}
