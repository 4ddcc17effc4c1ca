use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::auth::model::AuthenticatedUser;

/// Signed-in user as exposed to the browser
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// Avatar URL from the identity provider
    pub image: Option<String>,
}

impl From<AuthenticatedUser> for UserResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.user_id,
            email: user.email,
            name: user.name,
            image: user.image,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignOutResponseDto {
    /// Whether a live session was found and removed
    pub signed_out: bool,
}

/// Query parameters GitHub appends to the OAuth callback
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}
