use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use futures::future::BoxFuture;

use crate::auth::{extract_bearer_token, ApiError, AuthService, AuthUser, UserRole};

/// JWT authentication middleware. Decodes the bearer token and attaches the
/// principal to the request extensions for downstream guards and handlers.
pub async fn jwt_auth_middleware(
    State(auth_service): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    let token = extract_bearer_token(auth_header)?;
    let principal = auth_service.jwt().extract_auth_user(token)?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Role-based authorization guard wrapping an operation: Unauthorized when no
/// principal was attached, Forbidden when the principal's role is not in the
/// allow-list.
pub fn require_role(
    allowed: &'static [UserRole],
) -> impl Fn(Request, Next) -> BoxFuture<'static, Result<Response, ApiError>> + Clone {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let principal = request
                .extensions()
                .get::<AuthUser>()
                .ok_or_else(|| ApiError::unauthorized("Invalid authentication credentials"))?;

            if !allowed.contains(&principal.role) {
                return Err(ApiError::forbidden(
                    "You do not have permission to access this resource",
                ));
            }

            Ok(next.run(request).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_allow_lists() {
        let coach_only: &[UserRole] = &[UserRole::Coach];
        let user_or_admin: &[UserRole] = &[UserRole::User, UserRole::Admin];

        assert!(coach_only.contains(&UserRole::Coach));
        assert!(!coach_only.contains(&UserRole::Admin));
        assert!(user_or_admin.contains(&UserRole::Admin));
        assert!(!user_or_admin.contains(&UserRole::Coach));
    }
}
