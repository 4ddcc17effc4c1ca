use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::GitHubOAuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::clients::IdentityProvider;
use crate::features::auth::model::ExternalIdentity;
use crate::shared::constants::GITHUB_PROVIDER;

const OAUTH_SCOPE: &str = "read:user user:email";
const USER_AGENT: &str = "fileshare-core";

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

/// GitHub answers token errors with HTTP 200 and an `error` field
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    name: Option<String>,
    avatar_url: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    #[serde(default)]
    verified: bool,
}

/// GitHub OAuth app client
pub struct GitHubIdentityClient {
    config: GitHubOAuthConfig,
    http_client: reqwest::Client,
}

impl GitHubIdentityClient {
    pub fn new(config: GitHubOAuthConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&TokenRequest {
                client_id: &self.config.client_id,
                client_secret: &self.config.client_secret,
                code,
                redirect_uri: &self.config.redirect_url,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach GitHub token endpoint: {}", e);
                AppError::ExternalServiceError(format!("Failed to exchange code: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("GitHub token error: HTTP {} - {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "GitHub token error: HTTP {}",
                status
            )));
        }

        let token = response.json::<TokenResponse>().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse token response: {}", e))
        })?;

        match token {
            TokenResponse {
                access_token: Some(access_token),
                ..
            } if !access_token.is_empty() => Ok(access_token),
            TokenResponse {
                error,
                error_description,
                ..
            } => {
                let reason = error_description
                    .or(error)
                    .unwrap_or_else(|| "missing access_token".to_string());
                tracing::warn!("GitHub rejected authorization code: {}", reason);
                Err(AppError::ExternalServiceError(format!(
                    "GitHub rejected authorization code: {}",
                    reason
                )))
            }
        }
    }

    async fn fetch_user(&self, access_token: &str) -> Result<GitHubUser> {
        let url = format!("{}/user", self.config.api_base_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch GitHub user: {}", e);
                AppError::ExternalServiceError(format!("Failed to fetch user: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("GitHub user API error: HTTP {}", status);
            return Err(AppError::ExternalServiceError(format!(
                "GitHub user API error: HTTP {}",
                status
            )));
        }

        response.json::<GitHubUser>().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse user response: {}", e))
        })
    }

    /// Primary email from `/user/emails`. Any failure here yields `None`.
    async fn fetch_primary_email(&self, access_token: &str) -> Option<String> {
        let url = format!("{}/user/emails", self.config.api_base_url);

        let response = match self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!("GitHub emails API returned HTTP {}", response.status());
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch GitHub emails: {}", e);
                return None;
            }
        };

        match response.json::<Vec<GitHubEmail>>().await {
            Ok(emails) => select_primary_email(emails),
            Err(e) => {
                tracing::warn!("Failed to parse GitHub emails: {}", e);
                None
            }
        }
    }
}

fn select_primary_email(emails: Vec<GitHubEmail>) -> Option<String> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| emails.iter().find(|e| e.primary))
        .map(|e| e.email.clone())
}

#[async_trait]
impl IdentityProvider for GitHubIdentityClient {
    fn provider_name(&self) -> &str {
        GITHUB_PROVIDER
    }

    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&response_type=code&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode(OAUTH_SCOPE),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity> {
        let access_token = self.fetch_access_token(code).await?;
        let user = self.fetch_user(&access_token).await?;

        let email = match self.fetch_primary_email(&access_token).await {
            Some(email) => Some(email),
            None => user.email.clone(),
        };

        tracing::debug!("GitHub identity resolved: id={}, login={}", user.id, user.login);

        Ok(ExternalIdentity {
            provider: GITHUB_PROVIDER.to_string(),
            account_id: user.id.to_string(),
            name: user.name.or(Some(user.login)),
            avatar_url: user.avatar_url,
            email,
            access_token: Some(access_token),
        })
    }
}
