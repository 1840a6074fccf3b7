// lib.rs

mod config;
pub use config::*;

mod state;
pub use state::*;

mod measure;
pub use measure::*;

mod dht;
pub use dht::*;

mod report;
pub use report::*;

mod network;
pub use network::*;

mod monitor;
pub use monitor::*;

#[cfg(target_os = "espidf")]
mod wifi;
#[cfg(target_os = "espidf")]
pub use wifi::*;

#[cfg(target_os = "espidf")]
mod mqtt;
#[cfg(target_os = "espidf")]
pub use mqtt::*;

#[cfg(test)]
mod testing;

pub const FW_VERSION: &str = env!("CARGO_PKG_VERSION");

// EOF
