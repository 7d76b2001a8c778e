// src/middleware/role.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, User},
};

/// A role a route can demand.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

/// Extractor guard: rejects with 403 unless the caller has role `T`.
pub struct RequireRole<T>(pub User, PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        let required = T::role();
        if user.role != required {
            return Err(AppError::Forbidden(format!("this action requires the '{required:?}' role")));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// Roles
// ---

pub struct Seller;
impl RoleDef for Seller {
    fn role() -> Role {
        Role::Seller
    }
}
