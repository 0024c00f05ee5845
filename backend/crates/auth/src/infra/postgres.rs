//! PostgreSQL Repository Implementations
//!
//! Per-phone atomicity comes from row locks: every multi-step operation runs
//! in one transaction touching only that phone's rows.

use chrono::{DateTime, Utc};
use platform::rate_limit::{RateLimitConfig, RateLimitResult};
use sqlx::{PgConnection, PgPool};

use crate::domain::entity::{auth_code::AuthCode, user::UserRecord};
use crate::domain::repository::{CodeCheck, CodeStore, UserDirectory};
use crate::domain::value_object::{
    phone_number::PhoneNumber, user_uuid::UserUuid, verification_code::VerificationCode,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired codes and rate windows
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;

        let codes_deleted = sqlx::query("DELETE FROM auth_codes WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let windows_deleted =
            sqlx::query("DELETE FROM auth_code_limits WHERE window_expires_at_ms <= $1")
                .bind(now_ms)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        tx.commit().await?;

        tracing::info!(codes_deleted, windows_deleted, "Cleaned up expired auth codes");

        Ok(codes_deleted + windows_deleted)
    }
}

/// Count one hit against the phone's window
///
/// The conditional upsert either resets an expired window, bumps a window
/// with room left, or touches nothing; no row back means the hit was refused.
async fn hit_window(
    conn: &mut PgConnection,
    phone: &PhoneNumber,
    config: &RateLimitConfig,
    now_ms: i64,
) -> AuthResult<RateLimitResult> {
    if config.max_requests == 0 {
        return Ok(RateLimitResult::rejected(now_ms + config.window_ms()));
    }

    let accepted: Option<(i32, i64)> = sqlx::query_as(
        r#"
        INSERT INTO auth_code_limits (phone, request_count, window_expires_at_ms)
        VALUES ($1, 1, $2)
        ON CONFLICT (phone) DO UPDATE SET
            request_count = CASE
                WHEN auth_code_limits.window_expires_at_ms <= $3 THEN 1
                ELSE auth_code_limits.request_count + 1
            END,
            window_expires_at_ms = CASE
                WHEN auth_code_limits.window_expires_at_ms <= $3 THEN EXCLUDED.window_expires_at_ms
                ELSE auth_code_limits.window_expires_at_ms
            END
        WHERE auth_code_limits.window_expires_at_ms <= $3
           OR auth_code_limits.request_count < $4
        RETURNING request_count, window_expires_at_ms
        "#,
    )
    .bind(phone.as_str())
    .bind(now_ms + config.window_ms())
    .bind(now_ms)
    .bind(config.max_requests as i32)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((count, expires_at_ms)) = accepted {
        return Ok(RateLimitResult::accepted(count as u32, config, expires_at_ms));
    }

    let reset_at_ms: Option<i64> =
        sqlx::query_scalar("SELECT window_expires_at_ms FROM auth_code_limits WHERE phone = $1")
            .bind(phone.as_str())
            .fetch_optional(&mut *conn)
            .await?;

    Ok(RateLimitResult::rejected(
        reset_at_ms.unwrap_or(now_ms + config.window_ms()),
    ))
}

async fn upsert_code(conn: &mut PgConnection, code: &AuthCode) -> AuthResult<()> {
    sqlx::query(
        r#"
        INSERT INTO auth_codes (phone, code, expires_at_ms, attempts, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (phone) DO UPDATE SET
            code = EXCLUDED.code,
            expires_at_ms = EXCLUDED.expires_at_ms,
            attempts = EXCLUDED.attempts,
            created_at = EXCLUDED.created_at
        "#,
    )
    .bind(code.phone.as_str())
    .bind(code.code.as_str())
    .bind(code.expires_at_ms)
    .bind(code.failed_attempts as i32)
    .bind(code.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn delete_code_and_window(conn: &mut PgConnection, phone: &PhoneNumber) -> AuthResult<()> {
    sqlx::query("DELETE FROM auth_codes WHERE phone = $1")
        .bind(phone.as_str())
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM auth_code_limits WHERE phone = $1")
        .bind(phone.as_str())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

// ============================================================================
// Code Store Implementation
// ============================================================================

impl CodeStore for PgAuthRepository {
    async fn set(&self, code: &AuthCode) -> AuthResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_code(&mut conn, code).await
    }

    async fn get(&self, phone: &PhoneNumber) -> AuthResult<Option<AuthCode>> {
        let row = sqlx::query_as::<_, AuthCodeRow>(
            r#"
            SELECT phone, code, expires_at_ms, attempts, created_at
            FROM auth_codes
            WHERE phone = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(phone.as_str())
        .bind(Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthCodeRow::into_auth_code))
    }

    async fn delete(&self, phone: &PhoneNumber) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;
        delete_code_and_window(&mut tx, phone).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn increment_rate_counter(
        &self,
        phone: &PhoneNumber,
        config: &RateLimitConfig,
    ) -> AuthResult<RateLimitResult> {
        let mut conn = self.pool.acquire().await?;
        hit_window(&mut conn, phone, config, Utc::now().timestamp_millis()).await
    }

    async fn issue(
        &self,
        code: &AuthCode,
        config: &RateLimitConfig,
    ) -> AuthResult<RateLimitResult> {
        let mut tx = self.pool.begin().await?;

        let decision =
            hit_window(&mut tx, &code.phone, config, Utc::now().timestamp_millis()).await?;
        if decision.allowed {
            upsert_code(&mut tx, code).await?;
        }

        tx.commit().await?;
        Ok(decision)
    }

    async fn consume(
        &self,
        phone: &PhoneNumber,
        submitted: &VerificationCode,
        max_attempts: u32,
    ) -> AuthResult<CodeCheck> {
        let now_ms = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;

        let row: Option<(String, i64, i32)> = sqlx::query_as(
            "SELECT code, expires_at_ms, attempts FROM auth_codes WHERE phone = $1 FOR UPDATE",
        )
        .bind(phone.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let check = match row {
            None => CodeCheck::Expired,
            Some((_, expires_at_ms, _)) if expires_at_ms <= now_ms => {
                sqlx::query("DELETE FROM auth_codes WHERE phone = $1")
                    .bind(phone.as_str())
                    .execute(&mut *tx)
                    .await?;
                CodeCheck::Expired
            }
            Some((ref stored, _, _))
                if VerificationCode::from_db(stored.as_str()).matches(submitted) =>
            {
                delete_code_and_window(&mut tx, phone).await?;
                CodeCheck::Consumed
            }
            Some((_, _, attempts)) => {
                // The row lock makes read-then-write a single step per phone
                if i64::from(attempts) + 1 >= i64::from(max_attempts) {
                    sqlx::query("DELETE FROM auth_codes WHERE phone = $1")
                        .bind(phone.as_str())
                        .execute(&mut *tx)
                        .await?;
                    tracing::warn!(
                        phone = %phone.log_tag(),
                        "Code discarded after too many wrong guesses"
                    );
                } else {
                    sqlx::query("UPDATE auth_codes SET attempts = attempts + 1 WHERE phone = $1")
                        .bind(phone.as_str())
                        .execute(&mut *tx)
                        .await?;
                }
                CodeCheck::Mismatch
            }
        };

        tx.commit().await?;
        Ok(check)
    }

    async fn purge_expired(&self) -> AuthResult<u64> {
        self.cleanup_expired().await
    }
}

// ============================================================================
// User Directory Implementation
// ============================================================================

impl UserDirectory for PgAuthRepository {
    async fn find_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                uuid,
                phone,
                match_list,
                black_list,
                created_at,
                updated_at
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn create_if_absent(&self, user: &UserRecord) -> AuthResult<(UserRecord, bool)> {
        let inserted = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                uuid,
                phone,
                match_list,
                black_list,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (phone) DO NOTHING
            RETURNING uuid, phone, match_list, black_list, created_at, updated_at
            "#,
        )
        .bind(user.uuid.as_str())
        .bind(user.phone.as_str())
        .bind(&user.match_list)
        .bind(&user.black_list)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok((row.into_user(), true));
        }

        // Another insert won; its row is committed and visible now.
        match self.find_by_phone(&user.phone).await? {
            Some(existing) => Ok((existing, false)),
            None => Err(AuthError::TransientStore(
                "user row vanished during signup".to_string(),
            )),
        }
    }

    async fn delete_by_phone(&self, phone: &PhoneNumber) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE phone = $1")
            .bind(phone.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    uuid: String,
    phone: String,
    match_list: String,
    black_list: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> UserRecord {
        UserRecord {
            uuid: UserUuid::from_db(self.uuid),
            phone: PhoneNumber::from_db(self.phone),
            match_list: self.match_list,
            black_list: self.black_list,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthCodeRow {
    phone: String,
    code: String,
    expires_at_ms: i64,
    attempts: i32,
    created_at: DateTime<Utc>,
}

impl AuthCodeRow {
    fn into_auth_code(self) -> AuthCode {
        AuthCode {
            phone: PhoneNumber::from_db(self.phone),
            code: VerificationCode::from_db(self.code),
            expires_at_ms: self.expires_at_ms,
            failed_attempts: self.attempts.max(0) as u32,
            created_at: self.created_at,
        }
    }
}
