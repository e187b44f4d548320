pub mod auth;
pub mod response;

pub use auth::{AuthUser, CurrentIdentity};
pub use response::{ApiResponse, ApiResult};
