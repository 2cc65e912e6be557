//! Keepalive HTTP Adapter

pub mod server;

pub use server::{
    bind, router, run_with_server, serve, serve_listener, HealthResponse, ServerError, INDEX_TEXT,
};
