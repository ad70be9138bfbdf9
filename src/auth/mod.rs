pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use errors::ApiError;
pub use jwt::{extract_bearer_token, JwtService};
pub use middleware::{jwt_auth_middleware, require_role};
pub use models::*;
pub use service::AuthService;
