// Virtual servo bus for the Sagittarius arm

pub mod bus_config;
pub mod server;
pub mod virtual_arm;

pub use bus_config::BusConfig;
pub use server::{run, serve};
pub use virtual_arm::VirtualArm;
