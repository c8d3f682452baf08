//! SurrealDB implementation of [`RevocationStore`].
//!
//! Entries are keyed by token fingerprint (the record id), which makes
//! revoke/lookup per-token atomic. Expired entries are inert, since
//! the token codec already rejects expired tokens; `purge_expired`
//! reclaims them.

use chrono::{DateTime, Utc};
use gatehouse_core::GateResult;
use gatehouse_core::repository::RevocationStore;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RevocationRow {
    #[allow(dead_code)]
    expires_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the revocation store.
#[derive(Clone)]
pub struct SurrealRevocationStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRevocationStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RevocationStore for SurrealRevocationStore<C> {
    async fn revoke(&self, fingerprint: &str, expires_at: DateTime<Utc>) -> GateResult<()> {
        // UPSERT keeps the operation idempotent: revoking the same
        // token twice rewrites the same record.
        self.db
            .query(
                "UPSERT type::record('revoked_token', $fingerprint) SET \
                 expires_at = $expires_at",
            )
            .bind(("fingerprint", fingerprint.to_string()))
            .bind(("expires_at", expires_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn is_revoked(&self, fingerprint: &str) -> GateResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT expires_at FROM type::record('revoked_token', $fingerprint) \
                 WHERE expires_at > time::now()",
            )
            .bind(("fingerprint", fingerprint.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RevocationRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn purge_expired(&self) -> GateResult<u64> {
        // Count expired entries first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM revoked_token \
                 WHERE expires_at < time::now() GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE revoked_token WHERE expires_at < time::now()")
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
