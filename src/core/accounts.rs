//! User administration

use crate::core::error::{AuthError, QcError, QcResult, ValidationError};
use crate::core::identity::UserId;
use crate::core::password::hash_password;
use crate::core::session::Session;
use crate::core::store::Store;
use crate::entities::user::User;

/// Fields an administrator fills in for a user
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub username: String,
    pub full_name: String,
    /// Required on create; `None` on edit keeps the current password
    pub password: Option<String>,
    pub is_admin: bool,
}

impl UserForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::Required { field: "username" });
        }
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::Required { field: "full name" });
        }
        Ok(())
    }

    fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

pub fn list_users(store: &Store, session: &Session) -> QcResult<Vec<User>> {
    session.require_admin()?;
    Ok(store.list_users()?)
}

pub fn create_user(store: &Store, session: &Session, form: &UserForm) -> QcResult<UserId> {
    session.require_admin()?;
    form.validate()?;
    let password = form
        .new_password()
        .ok_or(ValidationError::Required { field: "password" })?;

    let username = form.username.trim();
    if store.get_user_by_username(username)?.is_some() {
        return Err(ValidationError::DuplicateUsername(username.to_string()).into());
    }

    let hash = hash_password(password).map_err(AuthError::from)?;
    let user = User::new(username, hash, form.full_name.trim(), form.is_admin);
    Ok(store.save_user(&user)?)
}

/// Update a user; a blank password keeps the current one
pub fn update_user(store: &Store, session: &Session, id: UserId, form: &UserForm) -> QcResult<User> {
    session.require_admin()?;
    form.validate()?;

    let mut user = store
        .get_user(id)?
        .ok_or_else(|| QcError::not_found(UserId::KIND, id))?;

    let username = form.username.trim();
    if let Some(other) = store.get_user_by_username(username)? {
        if other.id != Some(id) {
            return Err(ValidationError::DuplicateUsername(username.to_string()).into());
        }
    }

    user.username = username.to_string();
    user.full_name = form.full_name.trim().to_string();
    user.is_admin = form.is_admin;
    if let Some(password) = form.new_password() {
        user.password_hash =
            hash_password(password).map_err(AuthError::from)?;
    }
    store.save_user(&user)?;
    Ok(user)
}

/// Delete a user other than the one logged in
pub fn delete_user(store: &Store, session: &Session, id: UserId) -> QcResult<User> {
    let current = session.require_admin()?;
    if current.id == Some(id) {
        return Err(ValidationError::SelfDeletion.into());
    }
    let user = store
        .get_user(id)?
        .ok_or_else(|| QcError::not_found(UserId::KIND, id))?;
    store.delete_user(id)?;
    Ok(user)
}

/// Look a user up by username or numeric id
pub fn find_user(store: &Store, key: &str) -> QcResult<User> {
    if let Some(user) = store.get_user_by_username(key)? {
        return Ok(user);
    }
    if let Ok(id) = key.parse::<UserId>() {
        if let Some(user) = store.get_user(id)? {
            return Ok(user);
        }
    }
    Err(QcError::not_found(UserId::KIND, key))
}
