//! Product entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{ProductId, UserId};

/// A moulded product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,

    pub name: String,

    /// Unique catalogue number
    pub product_number: String,

    /// Creator; cleared if that user is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,

    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        product_number: impl Into<String>,
        created_by: Option<UserId>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            product_number: product_number.into(),
            created_by,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "product";

    fn id(&self) -> Option<ProductId> {
        self.id
    }
}
