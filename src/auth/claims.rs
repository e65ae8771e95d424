use serde::{Deserialize, Serialize};

/// `aud` may be a single string or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Verified claims of an access token issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub iss: String,
    pub aud: Audience,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    /// Scoped permissions such as `post:drinks`. Absent when the API has
    /// RBAC disabled at the issuer.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl Claims {
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("anonymous")
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .map(|granted| granted.iter().any(|p| p == permission))
            .unwrap_or(false)
    }
}
