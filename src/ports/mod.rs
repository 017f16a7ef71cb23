//! Port traits decoupling the domain from concrete adapters.

pub mod config_port;
pub mod market_data_port;
pub mod platform_port;
pub mod session_port;
