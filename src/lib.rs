pub mod collector;
pub mod config;
pub mod device;
pub mod encoding;
pub mod names;
pub mod service;
pub mod uapi;

pub use collector::{Collector, DeviceSource};
pub use config::Config;
pub use device::Device;
