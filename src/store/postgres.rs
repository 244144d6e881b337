//! PostgreSQL backend: table bootstrap and the supplier / user stores.

use crate::auth::IdentityError;
use crate::error::{AppError, ConfigError};
use crate::models::{Supplier, SupplierFields, User, UserClaim};
use crate::store::{FailedSignIn, SupplierStore, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use uuid::Uuid;

const SUPPLIER_COLUMNS: &str = "id, name, document, active";
const USER_COLUMNS: &str =
    "id, email, normalized_email, password_hash, access_failed_count, lockout_end, created_at";

/// Create the service tables if they do not exist. Safe to run on every start.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fornecedores (
            id UUID PRIMARY KEY,
            name VARCHAR(200) NOT NULL,
            document VARCHAR(20) NOT NULL,
            active BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email VARCHAR(256) NOT NULL,
            normalized_email VARCHAR(256) NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            access_failed_count INTEGER NOT NULL DEFAULT 0,
            lockout_end TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_claims (
            id BIGSERIAL PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            claim_type TEXT NOT NULL,
            claim_value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Ensure the database named in `database_url` exists, creating it through the
/// `postgres` maintenance database if not. Call before building the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some((admin, db_name)) = maintenance_target(database_url)? else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options for the `postgres` maintenance database plus the target database name.
/// `None` when the URL names no database or names `postgres` itself.
fn maintenance_target(database_url: &str) -> Result<Option<(PgConnectOptions, String)>, AppError> {
    let opts = PgConnectOptions::from_str(database_url).map_err(|e| ConfigError::Invalid {
        key: "DATABASE_URL",
        reason: e.to_string(),
    })?;
    let db_name = match opts.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(None),
    };
    Ok(Some((opts.database("postgres"), db_name)))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape LIKE metacharacters so the term matches literally (with `ESCAPE '\'`).
pub(crate) fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(Clone)]
pub struct PgSupplierStore {
    pool: PgPool,
}

impl PgSupplierStore {
    pub fn new(pool: PgPool) -> Self {
        PgSupplierStore { pool }
    }
}

#[async_trait]
impl SupplierStore for PgSupplierStore {
    async fn list_active(&self) -> Result<Vec<Supplier>, AppError> {
        let rows = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM fornecedores WHERE active = TRUE ORDER BY name",
            SUPPLIER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Supplier>, AppError> {
        let row = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM fornecedores WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, fields: SupplierFields) -> Result<Supplier, AppError> {
        let row = sqlx::query_as::<_, Supplier>(&format!(
            "INSERT INTO fornecedores (id, name, document, active) VALUES ($1, $2, $3, $4) RETURNING {}",
            SUPPLIER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(&fields.document)
        .bind(fields.active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, fields: SupplierFields) -> Result<Option<Supplier>, AppError> {
        let row = sqlx::query_as::<_, Supplier>(&format!(
            "UPDATE fornecedores SET name = $2, document = $3, active = $4 WHERE id = $1 RETURNING {}",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.document)
        .bind(fields.active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM fornecedores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, term: &str) -> Result<Vec<Supplier>, AppError> {
        let rows = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM fornecedores WHERE name ILIKE $1 ESCAPE '\\' OR document ILIKE $1 ESCAPE '\\' ORDER BY name",
            SUPPLIER_COLUMNS
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        PgUserStore { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE normalized_email = $1",
            USER_COLUMNS
        ))
        .bind(crate::models::user::normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, normalized_email, password_hash, access_failed_count, lockout_end, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(&user.password_hash)
        .bind(user.access_failed_count)
        .bind(user.lockout_end)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Identity(vec![IdentityError::duplicate_user_name(&user.email)]))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn reset_failed_sign_ins(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET access_failed_count = 0, lockout_end = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_failed_sign_in(
        &self,
        id: Uuid,
        max_failed_attempts: i32,
        now: DateTime<Utc>,
        lockout_end: DateTime<Utc>,
    ) -> Result<FailedSignIn, AppError> {
        // The row lock taken by UPDATE serializes concurrent failures; a count of 0
        // after a failure means this one tripped the lockout.
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE users SET
                access_failed_count = CASE WHEN access_failed_count + 1 >= $2 THEN 0
                                           ELSE access_failed_count + 1 END,
                lockout_end = CASE WHEN access_failed_count + 1 >= $2 THEN $4
                                   ELSE lockout_end END
            WHERE id = $1 AND (lockout_end IS NULL OR lockout_end <= $3)
            RETURNING access_failed_count
            "#,
        )
        .bind(id)
        .bind(max_failed_attempts)
        .bind(now)
        .bind(lockout_end)
        .fetch_optional(&self.pool)
        .await?;
        Ok(match row {
            None => FailedSignIn::AlreadyLockedOut,
            Some((0,)) => FailedSignIn::LockedOut,
            Some((count,)) => FailedSignIn::Counted(count),
        })
    }

    async fn claims(&self, user_id: Uuid) -> Result<Vec<UserClaim>, AppError> {
        let rows = sqlx::query_as::<_, UserClaim>(
            "SELECT claim_type, claim_value FROM user_claims WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn add_claim(&self, user_id: Uuid, claim: &UserClaim) -> Result<(), AppError> {
        sqlx::query("INSERT INTO user_claims (user_id, claim_type, claim_value) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(&claim.claim_type)
            .bind(&claim.claim_value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maintenance_target_swaps_in_postgres_database() {
        let (admin, db) = maintenance_target("postgres://u:p@localhost:5432/fornecedores")
            .unwrap()
            .unwrap();
        assert_eq!(db, "fornecedores");
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "localhost");
        assert_eq!(admin.get_port(), 5432);
    }

    #[test]
    fn maintenance_target_keeps_query_options_with_slashes() {
        let (admin, db) = maintenance_target(
            "postgres://u:p@db:5432/app?sslmode=verify-full&sslrootcert=/etc/ssl/ca.pem",
        )
        .unwrap()
        .unwrap();
        assert_eq!(db, "app");
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "db");
    }

    #[test]
    fn maintenance_target_skips_urls_without_a_database() {
        assert!(maintenance_target("postgres://u:p@db:5432").unwrap().is_none());
        assert!(maintenance_target("postgres://u:p@db:5432/postgres").unwrap().is_none());
        assert!(matches!(
            maintenance_target("not a url"),
            Err(AppError::Config(ConfigError::Invalid { key: "DATABASE_URL", .. }))
        ));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("my\"db"), "\"my\"\"db\"");
    }
}
