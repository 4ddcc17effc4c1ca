pub mod github_client;
pub mod identity_provider;

pub use github_client::GitHubIdentityClient;
pub use identity_provider::IdentityProvider;
