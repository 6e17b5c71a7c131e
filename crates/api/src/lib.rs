//! HTTP API: routing, request authorization and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
