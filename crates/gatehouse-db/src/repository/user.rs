//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use gatehouse_core::GateResult;
use gatehouse_core::models::role::Role;
use gatehouse_core::models::user::{CreateUser, User};
use gatehouse_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    email: String,
    password_hash: String,
    role: String,
    confirmed: bool,
    banned: bool,
    refresh_fingerprint: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    confirmed: bool,
    banned: bool,
    refresh_fingerprint: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    Role::parse(s).ok_or_else(|| DbError::Migration(format!("unknown user role: {s}")))
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            confirmed: self.confirmed,
            banned: self.banned,
            refresh_fingerprint: self.refresh_fingerprint,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            confirmed: self.confirmed,
            banned: self.banned,
            refresh_fingerprint: self.refresh_fingerprint,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn count_users(&self) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> GateResult<User> {
        // Duplicate precheck; the unique indexes remain the backstop
        // for races.
        let mut existing = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE username = $username OR email = $email",
            )
            .bind(("username", input.username.clone()))
            .bind(("email", input.email.clone()))
            .await
            .map_err(DbError::from)?;
        let taken: Vec<UserRowWithId> = existing.take(0).map_err(DbError::from)?;
        if !taken.is_empty() {
            return Err(DbError::AlreadyExists {
                entity: "user".into(),
            }
            .into());
        }

        // The first account ever created is the administrator.
        let role = if self.count_users().await? == 0 {
            Role::Admin
        } else {
            Role::User
        };

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email, \
                 password_hash = $password_hash, \
                 role = $role, \
                 confirmed = false, \
                 banned = false, \
                 refresh_fingerprint = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("password_hash", input.password_hash))
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_username(&self, username: &str) -> GateResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("username={username}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_email(&self, email: &str) -> GateResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn confirm_email(&self, email: &str) -> GateResult<User> {
        let user = self.get_by_email(email).await?;
        let id_str = user.id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 confirmed = true, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(user.id)?)
    }

    async fn update_email(&self, id: Uuid, new_email: &str) -> GateResult<User> {
        let id_str = id.to_string();

        // A new address always starts unconfirmed.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 email = $email, confirmed = false, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", new_email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> GateResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 password_hash = $password_hash, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("password_hash", password_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn store_refresh_fingerprint(
        &self,
        id: Uuid,
        fingerprint: Option<String>,
    ) -> GateResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 refresh_fingerprint = $fingerprint, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("fingerprint", fingerprint))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn swap_refresh_fingerprint(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> GateResult<bool> {
        // Single conditional UPDATE: the WHERE clause makes the swap a
        // compare-and-swap, so two racing rotations cannot both win.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 refresh_fingerprint = $replacement, \
                 updated_at = time::now() \
                 WHERE refresh_fingerprint = $expected",
            )
            .bind(("id", id.to_string()))
            .bind(("expected", expected.to_string()))
            .bind(("replacement", replacement.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn toggle_ban(&self, username: &str) -> GateResult<User> {
        let user = self.get_by_username(username).await?;
        let id_str = user.id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 banned = $banned, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("banned", !user.banned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(user.id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_rejects_unknown() {
        assert!(parse_role("Admin").is_ok());
        assert!(parse_role("Root").is_err());
    }
}
