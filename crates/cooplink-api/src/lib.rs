// cooplink-api: Async Rust client for the Omlet smart-coop cloud API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::CoopClient;
pub use error::Error;
pub use transport::{DEFAULT_TIMEOUT, TransportConfig};
