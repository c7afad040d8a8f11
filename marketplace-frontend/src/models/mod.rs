pub mod auth;
pub mod envelope;

pub use auth::{AuthPayload, LoginRequest, RefreshPayload, SignupRequest, SocialLoginRequest};
pub use envelope::ApiResponse;
