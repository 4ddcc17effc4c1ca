use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::files::workers::SweepSummary;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::users::handlers as users_handlers;
use crate::shared::types::{ApiResponse, Meta};

/// Default session cookie name, documented for the cookie security scheme
const SESSION_COOKIE_DOC_NAME: &str = "session.token";

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::signin_github,
        auth_handlers::callback_github,
        auth_handlers::get_session,
        auth_handlers::sign_out,
        // Users
        users_handlers::get_current_user,
        users_handlers::list_my_files,
        // Files
        files_handlers::upload_file,
        files_handlers::get_file,
        files_handlers::download_file,
        files_handlers::delete_file,
        // Internal
        files_handlers::trigger_cleanup,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth_dtos::UserResponseDto,
            auth_dtos::SignOutResponseDto,
            ApiResponse<auth_dtos::UserResponseDto>,
            ApiResponse<auth_dtos::SignOutResponseDto>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::UploadResponseDto,
            files_dtos::PublicFileResponseDto,
            files_dtos::OwnedFileResponseDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<files_dtos::UploadResponseDto>,
            ApiResponse<files_dtos::PublicFileResponseDto>,
            ApiResponse<Vec<files_dtos::OwnedFileResponseDto>>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
            // Internal
            SweepSummary,
            ApiResponse<SweepSummary>,
        )
    ),
    tags(
        (name = "auth", description = "GitHub sign-in and cookie sessions"),
        (name = "users", description = "Signed-in user and their files"),
        (name = "files", description = "Upload, share, download and delete files"),
        (name = "internal", description = "Operator endpoints"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "File Share API",
        version = "0.1.0",
        description = "Temporary file sharing with expiring public links",
    )
)]
pub struct ApiDoc;

/// Adds the session cookie and cleanup basic-auth security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    SESSION_COOKIE_DOC_NAME,
                ))),
            );
            components.add_security_scheme(
                "cleanup_basic",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/auth/signin/github",
            "/api/auth/callback/github",
            "/api/auth/session",
            "/api/auth/signout",
            "/api/user",
            "/api/user/files",
            "/api/file/upload",
            "/api/file/{id}",
            "/api/file/{id}/download",
            "/api/internal/cleanup",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }

        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("session_cookie"));
        assert!(schemes.contains_key("cleanup_basic"));
    }
}
