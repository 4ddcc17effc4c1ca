use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity resolved from a live session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    /// Session token the identity was resolved from (needed for sign-out)
    #[serde(skip_serializing)]
    pub session_id: String,
}

/// Row shape of the session ⋈ user lookup
#[derive(Debug, FromRow)]
pub struct SessionIdentityRow {
    pub session_id: String,
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl From<SessionIdentityRow> for AuthenticatedUser {
    fn from(row: SessionIdentityRow) -> Self {
        Self {
            user_id: row.user_id,
            email: row.email,
            name: row.name,
            image: row.image,
            session_id: row.session_id,
        }
    }
}

/// Database model for users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Database model for browser sessions
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub client: ClientMetadata,
}

/// Database model for a linked external identity
#[derive(Debug, Clone, FromRow)]
pub struct ExternalAccount {
    pub id: Uuid,
    pub provider: String,
    pub provider_account_id: String,
    pub user_id: Uuid,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExternalAccount {
    pub provider: String,
    pub provider_account_id: String,
    pub user_id: Uuid,
    pub access_token: Option<String>,
}

/// Verified identity returned by an OAuth provider after the code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub provider: String,
    pub account_id: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub access_token: Option<String>,
}

/// Request metadata recorded on a session for audit purposes only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMetadata {
    /// Client address from proxy headers (first `X-Forwarded-For` hop, then `X-Real-IP`)
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let ip_address = header_str("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .or_else(|| header_str("x-real-ip").map(String::from));

        Self {
            ip_address,
            user_agent: header_str(header::USER_AGENT.as_str()).map(String::from),
        }
    }
}
