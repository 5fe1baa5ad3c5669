//! User persistence

use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Store, StoreError};
use crate::core::entity::Entity;
use crate::core::identity::UserId;
use crate::entities::user::User;

const USER_COLUMNS: &str = "id, username, password_hash, full_name, is_admin, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get(0)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        is_admin: row.get(4)?,
        created_at: parse_timestamp(row, 5)?,
    })
}

impl Store {
    /// All users ordered by username
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Exact, case-sensitive username lookup
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Insert or update a user
    pub fn save_user(&self, user: &User) -> Result<UserId, StoreError> {
        match user.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO users (username, password_hash, full_name, is_admin, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        user.username,
                        user.password_hash,
                        user.full_name,
                        user.is_admin,
                        format_timestamp(&user.created_at),
                    ],
                )?;
                let id = UserId(self.conn.last_insert_rowid());
                tracing::info!(%id, username = %user.username, "created user");
                Ok(id)
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE users SET username = ?1, password_hash = ?2, full_name = ?3, is_admin = ?4
                     WHERE id = ?5",
                    params![
                        user.username,
                        user.password_hash,
                        user.full_name,
                        user.is_admin,
                        id
                    ],
                )?;
                if changed == 0 {
                    return Err(StoreError::Missing {
                        entity: UserId::KIND,
                        id: id.get(),
                    });
                }
                tracing::info!(%id, username = %user.username, "updated user");
                Ok(id)
            }
        }
    }

    /// Delete a user; returns false if no such user existed
    ///
    /// Entities the user created keep existing with their creator cleared.
    pub fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if removed > 0 {
            tracing::info!(%id, "deleted user");
        }
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_lookup() {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .save_user(&User::new("op1", "hash", "Operator One", false))
            .unwrap();

        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.username, "op1");
        assert_eq!(user.password_hash, "hash");
        assert!(!user.is_admin);

        assert!(store.get_user_by_username("OP1").unwrap().is_none());
    }

    #[test]
    fn test_update_existing() {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .save_user(&User::new("op1", "hash", "Operator One", false))
            .unwrap();

        let mut user = store.get_user(id).unwrap().unwrap();
        user.full_name = "Operator Uno".to_string();
        user.is_admin = true;
        assert_eq!(store.save_user(&user).unwrap(), id);

        let reloaded = store.get_user(id).unwrap().unwrap();
        assert_eq!(reloaded.full_name, "Operator Uno");
        assert!(reloaded.is_admin);
    }

    #[test]
    fn test_update_missing_user_fails() {
        let store = Store::open_in_memory().unwrap();
        let mut ghost = User::new("ghost", "hash", "Ghost", false);
        ghost.id = Some(UserId(404));
        let err = store.save_user(&ghost).unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "user", id: 404 }));
    }

    #[test]
    fn test_duplicate_username_rejected_by_store() {
        let store = Store::open_in_memory().unwrap();
        store
            .save_user(&User::new("op1", "hash", "One", false))
            .unwrap();
        let err = store
            .save_user(&User::new("op1", "hash", "Other", false))
            .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[test]
    fn test_delete_user() {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .save_user(&User::new("op1", "hash", "One", false))
            .unwrap();
        assert!(store.delete_user(id).unwrap());
        assert!(store.get_user(id).unwrap().is_none());
        assert!(!store.delete_user(id).unwrap());
    }
}
