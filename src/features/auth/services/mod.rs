pub mod auth_service;
pub mod session_service;

pub use auth_service::{AuthService, CallbackError};
pub use session_service::SessionService;
