//! Authentication module for the tradepost marketplace client
//!
//! This module provides the auth facade over the marketplace API:
//! phone verification, registration, login/logout, token refresh and
//! profile access, with a single-retry 401 handler around authorized
//! requests.

mod core;
mod phone;
mod profile;
mod refresh;
mod session;

pub use core::{AuthApi, Session};
