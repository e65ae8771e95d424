pub mod auth;
pub mod response;

pub use auth::{check_permission, require_permission, PermissionGuard};
pub use response::{ApiResponse, ApiResult};
