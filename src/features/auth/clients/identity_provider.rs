use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::auth::model::ExternalIdentity;

/// OAuth identity provider capable of the authorization-code flow
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider tag stored on linked accounts, e.g. `github`
    fn provider_name(&self) -> &str;

    /// URL the browser is redirected to for consent
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a verified identity
    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity>;
}
