//! HTTP server for the content pipeline.
//!
//! Exposes config, state, error handling, routes and the router builder so
//! the binary and the integration tests share them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
