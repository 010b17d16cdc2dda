// Authentication: password accounts, JWT access tokens and request extractors

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod routes;
pub mod service;

pub use config::{AdminConfig, AuthConfig, AuthMode};
pub use middleware::{AdminUser, AuthError, AuthState, AuthUser, FromRef};
pub use routes::AuthRoutesState;
pub use service::PasswordAuthProvider;
