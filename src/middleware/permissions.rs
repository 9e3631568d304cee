//! Role gates as type-safe authorization extractors
//!
//! Usage in handlers:
//! ```ignore
//! use crate::middleware::{AdminOnly, Authorized};
//!
//! async fn block_user(
//!     Authorized(admin, _): Authorized<AdminOnly>,
//!     Path(id): Path<i64>,
//! ) -> Result<Json<UserResponse>> {
//!     // Role and OTP verification already checked
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::user::{self, Role};

/// Trait for role gate marker types
pub trait RoleGate: Send + Sync + 'static {
    /// Gate name for error messages and logs
    const NAME: &'static str;

    fn allows(role: Role) -> bool;
}

/// Creates zero-sized marker types that implement `RoleGate`
macro_rules! define_role_gates {
    ($($(#[$meta:meta])* $name:ident => [$($role:ident),+]),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl RoleGate for $name {
                const NAME: &'static str = stringify!($name);

                fn allows(role: Role) -> bool {
                    matches!(role, $(Role::$role)|+)
                }
            }
        )*
    };
}

define_role_gates! {
    /// Legal team only
    AdminOnly => [Admin],
    /// Any signed-in, verified account
    AnyRole => [Admin, Client],
    /// Client accounts only
    ClientOnly => [Client],
}

fn authenticated(parts: &Parts) -> Result<&user::Model, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .map(|auth| &auth.0)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// Extractor that requires a role gate and a verified OTP.
///
/// The OTP state is read from the stored user, so verifying takes effect
/// without re-issuing the token.
#[derive(Debug, Clone)]
pub struct Authorized<G: RoleGate>(pub user::Model, pub PhantomData<G>);

impl<G: RoleGate> Authorized<G> {
    /// Get the authenticated user
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    /// Get the user ID
    pub fn user_id(&self) -> i64 {
        self.0.id
    }
}

impl<S, G> FromRequestParts<S> for Authorized<G>
where
    S: Send + Sync,
    G: RoleGate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !G::allows(user.role) {
            tracing::debug!(user_id = user.id, gate = G::NAME, "Role gate rejected request");
            return Err(AppError::Unauthorized(
                "You are not authorized to access this resource".to_string(),
            ));
        }
        if !user.otp_verified {
            return Err(AppError::Unauthorized(
                "Account not verified, please verify your OTP".to_string(),
            ));
        }

        Ok(Authorized(user.clone(), PhantomData))
    }
}

/// Any signed-in user, OTP verified or not. Only for requesting an OTP.
#[derive(Debug, Clone)]
pub struct PendingOtp(pub user::Model);

impl<S> FromRequestParts<S> for PendingOtp
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PendingOtp(authenticated(parts)?.clone()))
    }
}
