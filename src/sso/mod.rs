//! Outbound OAuth2 plumbing: provider registry and the authorization-code /
//! profile-fetch legs of the flow.

pub mod endpoints;
pub mod provider;

pub use endpoints::SsoEndpoints;
pub use provider::SsoProvider;
