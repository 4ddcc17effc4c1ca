use rand::RngCore;
use std::sync::Arc;

use crate::features::auth::clients::IdentityProvider;
use crate::features::auth::cookie::{build_cookie, build_removal_cookie};
use crate::features::auth::model::{ClientMetadata, Session};
use crate::features::auth::services::SessionService;
use crate::shared::constants::{OAUTH_STATE_COOKIE, OAUTH_STATE_MAX_AGE_SECS};

const STATE_BYTES: usize = 16;
const STATE_COOKIE_PATH: &str = "/api/auth";

/// Why an OAuth callback did not produce a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackError {
    NoCode,
    InvalidState,
    AuthError,
}

impl CallbackError {
    /// Value of the `error` query parameter on the redirect back to the app
    pub fn as_query_value(&self) -> &'static str {
        match self {
            CallbackError::NoCode => "no_code",
            CallbackError::InvalidState => "invalid_state",
            CallbackError::AuthError => "auth_error",
        }
    }
}

/// Authorization-code login flow on top of an identity provider
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    sessions: Arc<SessionService>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>, sessions: Arc<SessionService>) -> Self {
        Self { identity, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionService> {
        &self.sessions
    }

    pub fn provider_name(&self) -> &str {
        self.identity.provider_name()
    }

    /// Start a login: returns the provider consent URL and the CSRF state to pin in a cookie
    pub fn begin_sign_in(&self) -> (String, String) {
        let state = generate_state();
        (self.identity.authorization_url(&state), state)
    }

    /// Finish a login from the provider callback parameters
    pub async fn complete_sign_in(
        &self,
        code: Option<&str>,
        state: Option<&str>,
        expected_state: Option<&str>,
        client: ClientMetadata,
    ) -> std::result::Result<Session, CallbackError> {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return Err(CallbackError::NoCode);
        };

        match (state, expected_state) {
            (Some(received), Some(expected)) if received == expected => {}
            _ => {
                tracing::warn!(
                    "OAuth state mismatch for provider {}",
                    self.identity.provider_name()
                );
                return Err(CallbackError::InvalidState);
            }
        }

        let identity = self.identity.exchange_code(code).await.map_err(|e| {
            tracing::error!("OAuth code exchange failed: {}", e);
            CallbackError::AuthError
        })?;

        self.sessions.sign_in(&identity, client).await.map_err(|e| {
            tracing::error!("Failed to create session after OAuth callback: {}", e);
            CallbackError::AuthError
        })
    }

    pub fn state_cookie(&self, state: &str) -> String {
        build_cookie(
            OAUTH_STATE_COOKIE,
            state,
            STATE_COOKIE_PATH,
            OAUTH_STATE_MAX_AGE_SECS,
            self.sessions.secure_cookies(),
        )
    }

    pub fn clear_state_cookie(&self) -> String {
        build_removal_cookie(
            OAUTH_STATE_COOKIE,
            STATE_COOKIE_PATH,
            self.sessions.secure_cookies(),
        )
    }
}

fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        github_identity, session_config, FakeIdentityProvider, InMemoryDatabase,
    };

    fn service(db: &Arc<InMemoryDatabase>, identity: FakeIdentityProvider) -> AuthService {
        let sessions = Arc::new(SessionService::new(db.clone(), session_config()));
        AuthService::new(Arc::new(identity), sessions)
    }

    #[test]
    fn test_begin_sign_in_embeds_fresh_state() {
        let db = InMemoryDatabase::new();
        let auth = service(&db, FakeIdentityProvider::failing());

        let (url, state) = auth.begin_sign_in();
        let (_, other_state) = auth.begin_sign_in();

        assert_eq!(state.len(), 32);
        assert_ne!(state, other_state);
        assert!(url.ends_with(&format!("state={}", state)));
    }

    #[tokio::test]
    async fn test_complete_sign_in_creates_session() {
        let db = InMemoryDatabase::new();
        let auth = service(
            &db,
            FakeIdentityProvider::new(github_identity("100", Some("octo@example.com"))),
        );

        let session = auth
            .complete_sign_in(Some("code"), Some("s"), Some("s"), ClientMetadata::default())
            .await
            .unwrap();

        let header = format!("session.token={}", session.id);
        let user = auth
            .sessions()
            .resolve_session(Some(&header))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.email, "octo@example.com");
    }

    #[tokio::test]
    async fn test_complete_sign_in_rejections() {
        let db = InMemoryDatabase::new();
        let auth = service(&db, FakeIdentityProvider::new(github_identity("1", None)));

        let no_code = auth
            .complete_sign_in(None, Some("s"), Some("s"), ClientMetadata::default())
            .await;
        assert_eq!(no_code.unwrap_err(), CallbackError::NoCode);

        let mismatch = auth
            .complete_sign_in(Some("c"), Some("a"), Some("b"), ClientMetadata::default())
            .await;
        assert_eq!(mismatch.unwrap_err(), CallbackError::InvalidState);

        let missing_cookie = auth
            .complete_sign_in(Some("c"), Some("a"), None, ClientMetadata::default())
            .await;
        assert_eq!(missing_cookie.unwrap_err(), CallbackError::InvalidState);
        assert_eq!(db.user_count(), 0);
    }

    #[tokio::test]
    async fn test_complete_sign_in_provider_failure() {
        let db = InMemoryDatabase::new();
        let auth = service(&db, FakeIdentityProvider::failing());

        let result = auth
            .complete_sign_in(Some("c"), Some("s"), Some("s"), ClientMetadata::default())
            .await;
        assert_eq!(result.unwrap_err(), CallbackError::AuthError);
        assert_eq!(CallbackError::AuthError.as_query_value(), "auth_error");
    }

    #[test]
    fn test_state_cookie_scoped_to_auth_routes() {
        let db = InMemoryDatabase::new();
        let auth = service(&db, FakeIdentityProvider::failing());

        assert_eq!(
            auth.state_cookie("abc"),
            "oauth_state=abc; Path=/api/auth; HttpOnly; SameSite=Lax; Max-Age=600"
        );
        assert!(auth.clear_state_cookie().ends_with("Max-Age=0"));
    }
}
