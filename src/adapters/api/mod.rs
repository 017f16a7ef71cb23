//! Platform REST API adapter.

mod client;

pub use client::ApiClient;
