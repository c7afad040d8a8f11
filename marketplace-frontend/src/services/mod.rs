pub mod api_client;
pub mod auth;
pub mod endpoints;
pub mod metrics;

pub use api_client::{ApiClient, ApiError};
pub use auth::{SessionError, SessionService};
