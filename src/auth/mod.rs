pub mod claims;
pub mod error;
pub mod header;
pub mod jwks;
pub mod validator;

pub use claims::{Audience, Claims};
pub use error::AuthError;
pub use header::extract_bearer_token;
pub use jwks::{KeySource, RemoteKeySet, StaticKeySet};
pub use validator::TokenValidator;

/// Permission strings granted by the identity provider
pub mod permissions {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}
