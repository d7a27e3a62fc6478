//! Application services

pub mod auth;
pub mod chat;
pub mod trees;

pub use auth::AuthService;
pub use chat::{ChatService, Exchange};
pub use trees::TreeService;
