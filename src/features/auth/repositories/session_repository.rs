use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{handle_db_error, Result};
use crate::features::auth::model::{
    AuthenticatedUser, ExternalAccount, NewExternalAccount, NewSession, NewUser, Session,
    SessionIdentityRow, User,
};

/// Persistence for users, linked external accounts and sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Session joined with its user, only if `expires_at > now`
    async fn find_live_identity(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthenticatedUser>>;

    async fn find_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<ExternalAccount>>;

    /// Insert a user, or return the existing row with the same email
    async fn upsert_user_by_email(&self, user: NewUser) -> Result<User>;

    /// Insert an external account link, or refresh the cached token on the existing link.
    ///
    /// The returned row always carries the user the link was first created for.
    async fn upsert_account(&self, account: NewExternalAccount) -> Result<ExternalAccount>;

    async fn create_session(&self, session: NewSession) -> Result<Session>;

    /// Hard-delete a session. Returns `true` if a row was removed.
    async fn delete_session(&self, session_id: &str) -> Result<bool>;
}

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_live_identity(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthenticatedUser>> {
        let row: Option<SessionIdentityRow> = sqlx::query_as(
            r#"
            SELECT s.id AS session_id, u.id AS user_id, u.email, u.name, u.image
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = $1 AND s.expires_at > $2
            "#,
        )
        .bind(session_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthenticatedUser::from))
    }

    async fn find_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<ExternalAccount>> {
        let account = sqlx::query_as(
            r#"
            SELECT id, provider, provider_account_id, user_id, access_token, refresh_token,
                   id_token, token_expires_at, created_at, updated_at
            FROM external_accounts
            WHERE provider = $1 AND provider_account_id = $2
            "#,
        )
        .bind(provider)
        .bind(provider_account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn upsert_user_by_email(&self, user: NewUser) -> Result<User> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let user = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, name, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, name, image, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)?;

        Ok(user)
    }

    async fn upsert_account(&self, account: NewExternalAccount) -> Result<ExternalAccount> {
        let account = sqlx::query_as(
            r#"
            INSERT INTO external_accounts (id, provider, provider_account_id, user_id, access_token)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (provider, provider_account_id) DO UPDATE
                SET access_token = COALESCE(EXCLUDED.access_token, external_accounts.access_token),
                    updated_at = NOW()
            RETURNING id, provider, provider_account_id, user_id, access_token, refresh_token,
                      id_token, token_expires_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&account.provider)
        .bind(&account.provider_account_id)
        .bind(account.user_id)
        .bind(&account.access_token)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)?;

        Ok(account)
    }

    async fn create_session(&self, session: NewSession) -> Result<Session> {
        let session = sqlx::query_as(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, expires_at, ip_address, user_agent, created_at, updated_at
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(&session.client.ip_address)
        .bind(&session.client.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)?;

        Ok(session)
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
