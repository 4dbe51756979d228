// Middleware for CORS and diagnostics authentication

pub mod auth;
pub mod cors;

pub use auth::*;
pub use cors::*;
