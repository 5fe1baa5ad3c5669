//! Entity trait - common interface for all persisted record types

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;

/// Common trait for all PlasticQC entities
///
/// Saving an entity inserts it when [`Entity::id`] is `None` and updates
/// the existing row otherwise.
pub trait Entity: Serialize + DeserializeOwned {
    /// Typed identifier of this entity
    type Id: Copy + Display;

    /// Entity kind used in messages (e.g., "product")
    const KIND: &'static str;

    /// The assigned identifier, `None` until first saved
    fn id(&self) -> Option<Self::Id>;

    /// Whether this entity has never been written
    fn is_new(&self) -> bool {
        self.id().is_none()
    }
}
