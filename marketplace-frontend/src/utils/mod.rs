pub mod format;
pub mod jwt;
pub mod password;

pub use format::{format_price, slugify};
pub use password::{password_strength, PasswordStrength};
