pub mod clients;
pub mod cookie;
pub mod dtos;
pub mod handlers;
pub mod model;
pub mod repositories;
pub mod routes;
pub mod services;

pub use clients::{GitHubIdentityClient, IdentityProvider};
pub use repositories::{PgSessionRepository, SessionRepository};
pub use services::{AuthService, SessionService};
