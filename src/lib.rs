pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod sso;

pub use auth::{IdentityReconciler, TokenIssuer};
pub use db::AccountStore;
pub use error::AuthError;
