use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::admin::auth::{AuthError, hash_password, verify_password};
use crate::application::admin::{FormId, form_id};
use crate::application::repos::{NewUser, RepoError, UsersRepo};
use crate::application::validation::users::{validate_new_user, validate_password_change};
use crate::application::validation::{FieldErrors, FormData};
use crate::cache::CacheInvalidator;
use crate::domain::entities::UserRecord;
use crate::domain::types::EntityKind;

pub const DEFAULT_ADMIN_NAME: &str = "Admin";
pub const USER_CREATED: &str = "Admin user created.";
pub const USER_DELETED: &str = "Admin user deleted.";
pub const PASSWORD_UPDATED: &str = "Password updated.";

#[derive(Debug, Error)]
pub enum UserAdminError {
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("Unable to create user. Email may already exist.")]
    EmailTaken,
    #[error("Missing user ID.")]
    MissingId,
    #[error("User not found.")]
    NotFound,
    #[error("You cannot delete your own account.")]
    SelfDelete,
    #[error("Current password is incorrect.")]
    WrongPassword,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AdminUserService {
    users: Arc<dyn UsersRepo>,
    cache: CacheInvalidator,
    bcrypt_cost: u32,
}

impl AdminUserService {
    pub fn new(users: Arc<dyn UsersRepo>, cache: CacheInvalidator, bcrypt_cost: u32) -> Self {
        Self {
            users,
            cache,
            bcrypt_cost,
        }
    }

    pub async fn list(&self) -> Result<Vec<UserRecord>, UserAdminError> {
        Ok(self.users.list_users().await?)
    }

    pub async fn find(&self, id: Uuid) -> Result<UserRecord, UserAdminError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(UserAdminError::NotFound)
    }

    pub async fn create(&self, form: &FormData) -> Result<UserRecord, UserAdminError> {
        let payload = validate_new_user(form).map_err(UserAdminError::Validation)?;
        let password_hash = hash_password(payload.password, self.bcrypt_cost).await?;
        let user = self
            .users
            .create_user(NewUser {
                email: payload.email,
                password_hash,
                name: Some(payload.name.unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string())),
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => UserAdminError::EmailTaken,
                other => UserAdminError::Repo(other),
            })?;
        self.cache.invalidate(EntityKind::User);
        info!(target = "jdigital::admin::users", user_id = %user.id, "admin user created");
        Ok(user)
    }

    pub async fn delete(&self, actor: Uuid, form: &FormData) -> Result<String, UserAdminError> {
        let id = match form_id(form.get("id")) {
            FormId::Missing => return Err(UserAdminError::MissingId),
            FormId::Malformed => return Err(UserAdminError::NotFound),
            FormId::Present(id) => id,
        };
        if id == actor {
            return Err(UserAdminError::SelfDelete);
        }
        if !self.users.delete_user(id).await? {
            return Err(UserAdminError::NotFound);
        }
        self.cache.invalidate(EntityKind::User);
        info!(
            target = "jdigital::admin::users",
            user_id = %id,
            actor = %actor,
            "admin user deleted"
        );
        Ok(USER_DELETED.to_string())
    }

    pub async fn change_password(
        &self,
        actor: Uuid,
        form: &FormData,
    ) -> Result<String, UserAdminError> {
        let payload = validate_password_change(form).map_err(UserAdminError::Validation)?;
        let user = self.find(actor).await?;
        if !verify_password(payload.current_password, user.password_hash).await? {
            return Err(UserAdminError::WrongPassword);
        }

        let hash = hash_password(payload.new_password, self.bcrypt_cost).await?;
        if !self.users.update_password_hash(actor, &hash).await? {
            return Err(UserAdminError::NotFound);
        }
        info!(target = "jdigital::admin::users", user_id = %actor, "password updated");
        Ok(PASSWORD_UPDATED.to_string())
    }

    /// Creates the first admin unless the email already has an account.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Option<UserRecord>, UserAdminError> {
        let mut form = FormData::new()
            .with("email", email)
            .with("password", password);
        if let Some(name) = name {
            form = form.with("name", name);
        }
        let normalized = email.trim().to_ascii_lowercase();
        if self.users.find_by_email(&normalized).await?.is_some() {
            info!(target = "jdigital::admin::users", email = %normalized, "admin already exists");
            return Ok(None);
        }
        self.create(&form).await.map(Some)
    }
}
