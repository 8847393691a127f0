//! The identity core: password hashing, session token issuance, and the
//! reconciliation logic that maps provider claims onto accounts.

pub mod password;
pub mod reconciler;
pub mod token;

pub use reconciler::{IdentityReconciler, MatchStrategy, ProviderClaims};
pub use token::{SessionClaims, TokenIssuer};
