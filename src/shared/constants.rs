/// Shortest allowed share lifetime, in days
pub const MIN_EXPIRES_IN_DAYS: i64 = 1;

/// Longest allowed share lifetime, in days
pub const MAX_EXPIRES_IN_DAYS: i64 = 30;

/// Fallback MIME type when the client does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// =============================================================================
// AUTH CONSTANTS
// =============================================================================

/// Provider name stored on external accounts created through GitHub sign-in
pub const GITHUB_PROVIDER: &str = "github";

/// Cookie carrying the OAuth `state` value between sign-in and callback
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Lifetime of the OAuth `state` cookie, in seconds
pub const OAUTH_STATE_MAX_AGE_SECS: i64 = 600;
