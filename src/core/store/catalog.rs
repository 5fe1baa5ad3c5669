//! Product and standard persistence

use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Store, StoreError};
use crate::core::entity::Entity;
use crate::core::identity::{ProductId, StandardId};
use crate::core::tolerance::ToleranceBand;
use crate::entities::product::Product;
use crate::entities::standard::ProductStandard;

const PRODUCT_COLUMNS: &str = "id, name, product_number, created_by, created_at";

const STANDARD_COLUMNS: &str = "id, product_id, machine_number, quantity_per_cycle,
    standard_weight, weight_plus_tol, weight_minus_tol,
    standard_height, height_plus_tol, height_minus_tol,
    standard_rim_thickness, rim_plus_tol, rim_minus_tol,
    standard_load, load_plus_tol, load_minus_tol,
    created_by, created_at";

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        product_number: row.get(2)?,
        created_by: row.get(3)?,
        created_at: parse_timestamp(row, 4)?,
    })
}

fn band_at(row: &Row<'_>, first: usize) -> rusqlite::Result<ToleranceBand> {
    Ok(ToleranceBand::new(
        row.get(first)?,
        row.get(first + 1)?,
        row.get(first + 2)?,
    ))
}

fn standard_from_row(row: &Row<'_>) -> rusqlite::Result<ProductStandard> {
    Ok(ProductStandard {
        id: Some(row.get(0)?),
        product_id: row.get(1)?,
        machine_number: row.get(2)?,
        quantity_per_cycle: row.get(3)?,
        weight: band_at(row, 4)?,
        height: band_at(row, 7)?,
        rim_thickness: band_at(row, 10)?,
        load: band_at(row, 13)?,
        created_by: row.get(16)?,
        created_at: parse_timestamp(row, 17)?,
    })
}

impl Store {
    /// All products ordered by name
    pub fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, product_number"
        ))?;
        let products = stmt
            .query_map([], product_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(count = products.len(), "listed products");
        Ok(products)
    }

    pub fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                params![id],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    pub fn get_product_by_number(&self, number: &str) -> Result<Option<Product>, StoreError> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_number = ?1"),
                params![number],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    pub fn save_product(&self, product: &Product) -> Result<ProductId, StoreError> {
        match product.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO products (name, product_number, created_by, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        product.name,
                        product.product_number,
                        product.created_by,
                        format_timestamp(&product.created_at),
                    ],
                )?;
                let id = ProductId(self.conn.last_insert_rowid());
                tracing::info!(%id, number = %product.product_number, "created product");
                Ok(id)
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE products SET name = ?1, product_number = ?2 WHERE id = ?3",
                    params![product.name, product.product_number, id],
                )?;
                if changed == 0 {
                    return Err(StoreError::Missing {
                        entity: ProductId::KIND,
                        id: id.get(),
                    });
                }
                tracing::info!(%id, number = %product.product_number, "updated product");
                Ok(id)
            }
        }
    }

    /// Delete a product with its standards, records and measurements
    pub fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        if removed > 0 {
            tracing::info!(%id, "deleted product");
        }
        Ok(removed > 0)
    }

    /// Standards of one product ordered by machine number
    pub fn list_standards(&self, product_id: ProductId) -> Result<Vec<ProductStandard>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STANDARD_COLUMNS} FROM product_standards
             WHERE product_id = ?1 ORDER BY machine_number, id"
        ))?;
        let standards = stmt
            .query_map(params![product_id], standard_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(standards)
    }

    pub fn get_standard(&self, id: StandardId) -> Result<Option<ProductStandard>, StoreError> {
        let standard = self
            .conn
            .query_row(
                &format!("SELECT {STANDARD_COLUMNS} FROM product_standards WHERE id = ?1"),
                params![id],
                standard_from_row,
            )
            .optional()?;
        Ok(standard)
    }

    pub fn save_standard(&self, standard: &ProductStandard) -> Result<StandardId, StoreError> {
        let s = standard;
        match s.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO product_standards (
                        product_id, machine_number, quantity_per_cycle,
                        standard_weight, weight_plus_tol, weight_minus_tol,
                        standard_height, height_plus_tol, height_minus_tol,
                        standard_rim_thickness, rim_plus_tol, rim_minus_tol,
                        standard_load, load_plus_tol, load_minus_tol,
                        created_by, created_at
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                    params![
                        s.product_id,
                        s.machine_number,
                        s.quantity_per_cycle,
                        s.weight.nominal,
                        s.weight.plus,
                        s.weight.minus,
                        s.height.nominal,
                        s.height.plus,
                        s.height.minus,
                        s.rim_thickness.nominal,
                        s.rim_thickness.plus,
                        s.rim_thickness.minus,
                        s.load.nominal,
                        s.load.plus,
                        s.load.minus,
                        s.created_by,
                        format_timestamp(&s.created_at),
                    ],
                )?;
                let id = StandardId(self.conn.last_insert_rowid());
                tracing::info!(%id, product = %s.product_id, machine = %s.machine_number, "created standard");
                Ok(id)
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE product_standards SET
                        product_id = ?1, machine_number = ?2, quantity_per_cycle = ?3,
                        standard_weight = ?4, weight_plus_tol = ?5, weight_minus_tol = ?6,
                        standard_height = ?7, height_plus_tol = ?8, height_minus_tol = ?9,
                        standard_rim_thickness = ?10, rim_plus_tol = ?11, rim_minus_tol = ?12,
                        standard_load = ?13, load_plus_tol = ?14, load_minus_tol = ?15
                     WHERE id = ?16",
                    params![
                        s.product_id,
                        s.machine_number,
                        s.quantity_per_cycle,
                        s.weight.nominal,
                        s.weight.plus,
                        s.weight.minus,
                        s.height.nominal,
                        s.height.plus,
                        s.height.minus,
                        s.rim_thickness.nominal,
                        s.rim_thickness.plus,
                        s.rim_thickness.minus,
                        s.load.nominal,
                        s.load.plus,
                        s.load.minus,
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(StoreError::Missing {
                        entity: StandardId::KIND,
                        id: id.get(),
                    });
                }
                tracing::info!(%id, machine = %s.machine_number, "updated standard");
                Ok(id)
            }
        }
    }

    /// Delete a standard together with the records taken against it
    pub fn delete_standard(&self, id: StandardId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM product_standards WHERE id = ?1", params![id])?;
        if removed > 0 {
            tracing::info!(%id, "deleted standard");
        }
        Ok(removed > 0)
    }
}
