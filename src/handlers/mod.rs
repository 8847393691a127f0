pub mod local;
pub mod session;
pub mod sso;
