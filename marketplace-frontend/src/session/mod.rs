//! Client session: credentials, their durable persistence, and the
//! HTTP-only cookie mirror read by the route guard.

pub mod bridge;
pub mod cookie;
pub mod model;
pub mod store;

pub use bridge::{BridgeError, CookieBridge, HttpCookieBridge};
pub use cookie::AUTH_COOKIE_NAME;
pub use model::{Session, SessionUser, TokenPair};
pub use store::TokenStore;
