//! Concrete adapter implementations for ports.

pub mod api;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod session_file_adapter;
pub mod web;
