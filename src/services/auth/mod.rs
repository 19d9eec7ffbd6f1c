pub mod error;
pub mod factory;
pub mod jwks;
pub mod key_resolver;
pub mod permissions;
pub mod service;
pub mod verifier;

#[cfg(test)]
pub mod test_support;

pub use error::AuthError;
pub use factory::build_auth_service;
pub use jwks::HttpJwksFetcher;
pub use key_resolver::KeyResolver;
pub use permissions::Requirement;
pub use service::AuthService;
pub use verifier::{DecodedClaims, TokenVerifier};
