//! Client for a single-channel group chat service.
//!
//! The crate keeps the session (token and member profile) in sync with
//! durable local storage, attaches the token to protected API requests, and
//! drives the login, registration, chat and profile views against the
//! backend.

pub mod common;
pub mod config;
pub mod network;
pub mod session;
pub mod storage;
pub mod ui;
