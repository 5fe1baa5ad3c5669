//! Product and standard administration

use crate::core::error::{QcError, QcResult, ValidationError};
use crate::core::identity::{ProductId, StandardId};
use crate::core::session::Session;
use crate::core::store::Store;
use crate::core::tolerance::ToleranceBand;
use crate::entities::product::Product;
use crate::entities::standard::ProductStandard;

/// Fields an administrator fills in for a product
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub product_number: String,
}

impl ProductForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product name",
            });
        }
        if self.product_number.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product number",
            });
        }
        Ok(())
    }
}

/// Fields an administrator fills in for a standard
#[derive(Debug, Clone, Default)]
pub struct StandardForm {
    pub machine_number: String,
    pub quantity_per_cycle: u32,
    pub weight: ToleranceBand,
    pub height: ToleranceBand,
    pub rim_thickness: ToleranceBand,
    pub load: ToleranceBand,
}

impl StandardForm {
    /// Prefill a form from an existing standard
    pub fn from_standard(standard: &ProductStandard) -> Self {
        Self {
            machine_number: standard.machine_number.clone(),
            quantity_per_cycle: standard.quantity_per_cycle,
            weight: standard.weight,
            height: standard.height,
            rim_thickness: standard.rim_thickness,
            load: standard.load,
        }
    }

    fn apply(&self, standard: &mut ProductStandard) {
        standard.machine_number = self.machine_number.trim().to_string();
        standard.quantity_per_cycle = self.quantity_per_cycle;
        standard.weight = self.weight;
        standard.height = self.height;
        standard.rim_thickness = self.rim_thickness;
        standard.load = self.load;
    }
}

pub fn list_products(store: &Store, session: &Session) -> QcResult<Vec<Product>> {
    session.require_user()?;
    Ok(store.list_products()?)
}

/// Look a product up by product number, then by numeric id
pub fn find_product(store: &Store, key: &str) -> QcResult<Product> {
    if let Some(product) = store.get_product_by_number(key.trim())? {
        return Ok(product);
    }
    if let Ok(id) = key.parse::<ProductId>() {
        if let Some(product) = store.get_product(id)? {
            return Ok(product);
        }
    }
    Err(QcError::not_found(ProductId::KIND, key))
}

pub fn create_product(store: &Store, session: &Session, form: &ProductForm) -> QcResult<ProductId> {
    let admin = session.require_admin()?;
    form.validate()?;

    let number = form.product_number.trim();
    if store.get_product_by_number(number)?.is_some() {
        return Err(ValidationError::DuplicateProductNumber(number.to_string()).into());
    }
    let product = Product::new(form.name.trim(), number, admin.id);
    Ok(store.save_product(&product)?)
}

pub fn update_product(
    store: &Store,
    session: &Session,
    id: ProductId,
    form: &ProductForm,
) -> QcResult<Product> {
    session.require_admin()?;
    form.validate()?;

    let mut product = store
        .get_product(id)?
        .ok_or_else(|| QcError::not_found(ProductId::KIND, id))?;

    let number = form.product_number.trim();
    if let Some(other) = store.get_product_by_number(number)? {
        if other.id != Some(id) {
            return Err(ValidationError::DuplicateProductNumber(number.to_string()).into());
        }
    }

    product.name = form.name.trim().to_string();
    product.product_number = number.to_string();
    store.save_product(&product)?;
    Ok(product)
}

/// Delete a product along with its standards, records and measurements
pub fn delete_product(store: &Store, session: &Session, id: ProductId) -> QcResult<Product> {
    session.require_admin()?;
    let product = store
        .get_product(id)?
        .ok_or_else(|| QcError::not_found(ProductId::KIND, id))?;
    store.delete_product(id)?;
    Ok(product)
}

pub fn list_standards(
    store: &Store,
    session: &Session,
    product_id: ProductId,
) -> QcResult<Vec<ProductStandard>> {
    session.require_user()?;
    Ok(store.list_standards(product_id)?)
}

/// Look a standard up within a product by id, then by machine number
pub fn find_standard(store: &Store, product: &Product, key: &str) -> QcResult<ProductStandard> {
    let product_id = product
        .id
        .ok_or_else(|| QcError::not_found(ProductId::KIND, &product.product_number))?;

    if let Ok(id) = key.parse::<StandardId>() {
        if let Some(standard) = store.get_standard(id)? {
            if standard.product_id == product_id {
                return Ok(standard);
            }
        }
    }
    store
        .list_standards(product_id)?
        .into_iter()
        .find(|s| s.machine_number == key.trim())
        .ok_or_else(|| QcError::not_found(StandardId::KIND, key))
}

pub fn create_standard(
    store: &Store,
    session: &Session,
    product_id: ProductId,
    form: &StandardForm,
) -> QcResult<StandardId> {
    let admin = session.require_admin()?;
    if store.get_product(product_id)?.is_none() {
        return Err(QcError::not_found(ProductId::KIND, product_id));
    }

    let mut standard = ProductStandard::new(product_id, "", form.quantity_per_cycle, admin.id);
    form.apply(&mut standard);
    standard.validate()?;
    Ok(store.save_standard(&standard)?)
}

/// Update a standard; existing records are re-graded against the new values
pub fn update_standard(
    store: &Store,
    session: &Session,
    id: StandardId,
    form: &StandardForm,
) -> QcResult<ProductStandard> {
    session.require_admin()?;
    let mut standard = store
        .get_standard(id)?
        .ok_or_else(|| QcError::not_found(StandardId::KIND, id))?;
    form.apply(&mut standard);
    standard.validate()?;
    store.save_standard(&standard)?;
    Ok(standard)
}

/// Delete a standard along with the records taken against it
pub fn delete_standard(
    store: &Store,
    session: &Session,
    id: StandardId,
) -> QcResult<ProductStandard> {
    session.require_admin()?;
    let standard = store
        .get_standard(id)?
        .ok_or_else(|| QcError::not_found(StandardId::KIND, id))?;
    store.delete_standard(id)?;
    Ok(standard)
}
