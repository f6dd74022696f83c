#[cfg(feature="driver")]
mod arm;
#[cfg(feature="driver")]
pub use arm::*;

#[cfg(feature="driver")]
mod transport;
#[cfg(feature="driver")]
pub use transport::*;

mod models;
pub use models::*;

mod driver_config;
pub use driver_config::*;
