//! Hyperwave Types - Shared domain types
//!
//! Types shared between the store and the auth core:
//! - token purposes, roles and lifetimes
//! - user identity
//! - issued token pairs

pub mod session;
pub mod token;
pub mod user;

pub use session::*;
pub use token::*;
pub use user::*;
