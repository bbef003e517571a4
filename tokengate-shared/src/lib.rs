//! # Tokengate Shared Library
//!
//! This crate contains the token subsystem and the request authentication
//! gate used by the Tokengate API server.
//!
//! ## Module Organization
//!
//! - `token`: Token payload, the `TokenMaker` contract, JWT and PASETO makers
//! - `auth`: Authentication middleware and password hashing
//! - `models`: User records and the user store used by the login flow

pub mod auth;
pub mod models;
pub mod token;

/// Current version of the Tokengate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
