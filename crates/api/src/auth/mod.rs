//! Authentication for the Gymstack API

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtManager};
pub use middleware::{
    admin_auth, auth_rate_limit, general_rate_limit, gym_auth, require_admin, require_gym_manager,
    verify_tenant_access, AuthAdmin, AuthGym,
};
pub use password::{hash_password, validate_password_strength, verify_password};
