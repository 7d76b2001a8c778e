// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

// Claims carried by the JWT. Accounts live in the identity provider behind
// `/api/login`; this service only trusts the signed token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user id
    pub role: Role,
    pub exp: usize, // expiry
    pub iat: usize, // issued at
}

/// The caller of a request, as resolved by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
}

impl From<&Claims> for User {
    fn from(claims: &Claims) -> Self {
        Self { id: claims.sub, role: claims.role }
    }
}
