//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Registration and username/password login
//! - Google ID token sign-in
//! - Session token signing and verification
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod token;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
