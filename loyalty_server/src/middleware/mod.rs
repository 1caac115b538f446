mod auth;

pub use auth::{AuthMiddlewareFactory, AuthenticatedUser};
