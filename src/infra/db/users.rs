use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{NewUser, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: Option<String>,
    created_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(UserRecord::from))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, password_hash, name) VALUES ($1, $2, $3, $4) \
             RETURNING id, email, password_hash, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.name)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(UserRecord::from(row))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, name, created_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
