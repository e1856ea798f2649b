//! Token claim decoding and expiry checks.

pub mod claims;
pub mod validator;

pub use claims::TokenClaims;
pub use validator::TokenValidator;
