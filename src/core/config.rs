use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub github: GitHubOAuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub files: FileConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Public base URL of the service, used for share links and OAuth redirects
    pub app_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Browser session cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_days: i64,
    /// Adds the `Secure` attribute; derived from an https `APP_URL`
    pub secure_cookie: bool,
}

/// GitHub OAuth application credentials
#[derive(Debug, Clone)]
pub struct GitHubOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for uploaded file payloads
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket name for storing files
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
}

/// Upload limits and defaults
#[derive(Debug, Clone)]
pub struct FileConfig {
    pub max_upload_size: usize,
    pub default_expires_in_days: i64,
}

/// Expiration sweep scheduling
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub trigger_username: Option<String>,
    pub trigger_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;
        let session = SessionConfig::from_env(&app.app_url)?;
        let github = GitHubOAuthConfig::from_env(&app.app_url)?;

        Ok(Config {
            app,
            database: DatabaseConfig::from_env()?,
            session,
            github,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            files: FileConfig::from_env()?,
            cleanup: CleanupConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let app_url = env::var("APP_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            app_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SessionConfig {
    const DEFAULT_COOKIE_NAME: &'static str = "session.token";
    const DEFAULT_TTL_DAYS: i64 = 7;

    pub fn from_env(app_url: &str) -> Result<Self, String> {
        let cookie_name = env::var("SESSION_COOKIE_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_COOKIE_NAME.to_string());

        let ttl_days = env::var("SESSION_TTL_DAYS")
            .unwrap_or_else(|_| Self::DEFAULT_TTL_DAYS.to_string())
            .parse::<i64>()
            .map_err(|_| "SESSION_TTL_DAYS must be a valid number".to_string())?;

        if ttl_days < 1 {
            return Err("SESSION_TTL_DAYS must be at least 1".to_string());
        }

        Ok(Self {
            cookie_name,
            ttl_days,
            secure_cookie: app_url.starts_with("https"),
        })
    }

    /// Cookie lifetime in seconds
    pub fn max_age_secs(&self) -> i64 {
        self.ttl_days * 24 * 60 * 60
    }
}

impl GitHubOAuthConfig {
    pub fn from_env(app_url: &str) -> Result<Self, String> {
        let client_id = env::var("GITHUB_CLIENT_ID")
            .map_err(|_| "GITHUB_CLIENT_ID environment variable is required".to_string())?;

        let client_secret = env::var("GITHUB_CLIENT_SECRET")
            .map_err(|_| "GITHUB_CLIENT_SECRET environment variable is required".to_string())?;

        let redirect_url = env::var("GITHUB_REDIRECT_URL")
            .unwrap_or_else(|_| format!("{}/api/auth/callback/github", app_url));

        Ok(Self {
            client_id,
            client_secret,
            redirect_url,
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            api_base_url: env::var("GITHUB_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "File Share API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Temporary file sharing with expiring public links".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        basic_credentials(&self.username, &self.password)
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "fileshare-uploads".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
        })
    }
}

impl FileConfig {
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024; // 100MB
    const DEFAULT_EXPIRES_IN_DAYS: i64 = 7;

    pub fn from_env() -> Result<Self, String> {
        let max_upload_size = env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_UPLOAD_SIZE must be a valid number".to_string())?;

        let default_expires_in_days = env::var("DEFAULT_EXPIRES_IN_DAYS")
            .unwrap_or_else(|_| Self::DEFAULT_EXPIRES_IN_DAYS.to_string())
            .parse::<i64>()
            .map_err(|_| "DEFAULT_EXPIRES_IN_DAYS must be a valid number".to_string())?;

        Ok(Self {
            max_upload_size,
            default_expires_in_days,
        })
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            max_upload_size: Self::DEFAULT_MAX_UPLOAD_SIZE,
            default_expires_in_days: Self::DEFAULT_EXPIRES_IN_DAYS,
        }
    }
}

impl CleanupConfig {
    const DEFAULT_INTERVAL_SECS: u64 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        let enabled = env::var("CLEANUP_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|_| "CLEANUP_ENABLED must be true or false".to_string())?;

        let interval_secs = env::var("CLEANUP_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "CLEANUP_INTERVAL_SECS must be a valid number".to_string())?;

        if interval_secs == 0 {
            return Err("CLEANUP_INTERVAL_SECS must be greater than zero".to_string());
        }

        let trigger_username = env::var("CLEANUP_TRIGGER_USERNAME")
            .ok()
            .filter(|s| !s.is_empty());
        let trigger_password = env::var("CLEANUP_TRIGGER_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            enabled,
            interval: Duration::from_secs(interval_secs),
            trigger_username,
            trigger_password,
        })
    }

    /// Credentials guarding the external cleanup trigger, if configured
    pub fn trigger_credentials(&self) -> Option<String> {
        basic_credentials(&self.trigger_username, &self.trigger_password)
    }
}

fn basic_credentials(username: &Option<String>, password: &Option<String>) -> Option<String> {
    match (username, password) {
        (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_secure_follows_app_url_scheme() {
        let secure = SessionConfig::from_env("https://share.example.com").unwrap();
        assert!(secure.secure_cookie);
        assert_eq!(secure.cookie_name, "session.token");
        assert_eq!(secure.max_age_secs(), 604_800);

        let plain = SessionConfig::from_env("http://localhost:3000").unwrap();
        assert!(!plain.secure_cookie);
    }

    #[test]
    fn test_basic_credentials_require_both_parts() {
        assert_eq!(
            basic_credentials(&Some("cron".to_string()), &Some("secret".to_string())),
            Some("cron:secret".to_string())
        );
        assert_eq!(basic_credentials(&Some("cron".to_string()), &None), None);
        assert_eq!(basic_credentials(&None, &None), None);
    }
}
