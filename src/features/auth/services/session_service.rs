use chrono::{Duration, Utc};
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::config::SessionConfig;
use crate::core::error::Result;
use crate::features::auth::cookie::{build_cookie, build_removal_cookie, find_cookie};
use crate::features::auth::model::{
    AuthenticatedUser, ClientMetadata, ExternalIdentity, NewExternalAccount, NewSession, NewUser,
    Session,
};
use crate::features::auth::repositories::SessionRepository;

const SESSION_TOKEN_BYTES: usize = 32;
const COOKIE_PATH: &str = "/";

/// Resolves session cookies to identities and issues/revokes sessions
pub struct SessionService {
    repo: Arc<dyn SessionRepository>,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(repo: Arc<dyn SessionRepository>, config: SessionConfig) -> Self {
        Self { repo, config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Resolve a raw `Cookie` header to the identity behind a live session.
    ///
    /// Returns `None` without touching the store when the header or the session
    /// cookie is absent. Expired and unknown tokens are indistinguishable.
    pub async fn resolve_session(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<Option<AuthenticatedUser>> {
        let Some(token) = cookie_header.and_then(|h| find_cookie(h, &self.config.cookie_name))
        else {
            return Ok(None);
        };

        self.repo.find_live_identity(token, Utc::now()).await
    }

    /// Map a verified external identity to a local user and open a new session.
    ///
    /// An already-linked account wins over an email match, so a changed email at
    /// the provider keeps pointing at the same local user.
    pub async fn sign_in(
        &self,
        identity: &ExternalIdentity,
        client: ClientMetadata,
    ) -> Result<Session> {
        let user_id = match self
            .repo
            .find_account(&identity.provider, &identity.account_id)
            .await?
        {
            Some(account) => account.user_id,
            None => {
                let user = self
                    .repo
                    .upsert_user_by_email(NewUser {
                        email: identity_email(identity),
                        name: identity.name.clone(),
                        image: identity.avatar_url.clone(),
                    })
                    .await?;
                debug!("Resolved user {} for {} account", user.id, identity.provider);
                user.id
            }
        };

        let account = self
            .repo
            .upsert_account(NewExternalAccount {
                provider: identity.provider.clone(),
                provider_account_id: identity.account_id.clone(),
                user_id,
                access_token: identity.access_token.clone(),
            })
            .await?;

        let session = self
            .repo
            .create_session(NewSession {
                id: generate_session_token(),
                user_id: account.user_id,
                expires_at: Utc::now() + Duration::days(self.config.ttl_days),
                client,
            })
            .await?;

        info!(
            "Session created: user_id={}, provider={}, expires_at={}",
            session.user_id, identity.provider, session.expires_at
        );

        Ok(session)
    }

    /// Delete a session. Returns `false` when it was already gone.
    pub async fn sign_out(&self, session_id: &str) -> Result<bool> {
        let removed = self.repo.delete_session(session_id).await?;
        if removed {
            info!("Session revoked");
        }
        Ok(removed)
    }

    /// `Set-Cookie` value carrying a session token
    pub fn session_cookie(&self, token: &str) -> String {
        build_cookie(
            &self.config.cookie_name,
            token,
            COOKIE_PATH,
            self.config.max_age_secs(),
            self.config.secure_cookie,
        )
    }

    /// `Set-Cookie` value removing the session cookie
    pub fn clear_cookie(&self) -> String {
        build_removal_cookie(&self.config.cookie_name, COOKIE_PATH, self.config.secure_cookie)
    }

    pub fn secure_cookies(&self) -> bool {
        self.config.secure_cookie
    }
}

/// 32 random bytes, hex-encoded
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn identity_email(identity: &ExternalIdentity) -> String {
    match identity.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => email.to_string(),
        _ => format!("{}@{}.local", identity.account_id, identity.provider),
    }
}
