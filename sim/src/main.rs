use std::error::Error;
use std::sync::Arc;

use tokio::sync::Mutex;

use sagittarius::logging::{init_logging, log_set_level};
use sim::{run, BusConfig, VirtualArm};

/// Usage: `sim [config.json]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_logging()?;
    log_set_level(4)?;

    let config = match std::env::args().nth(1) {
        Some(path) => BusConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => BusConfig::default(),
    };

    let arm = Arc::new(Mutex::new(VirtualArm::new(&config)));
    run(&config.listen_addr, arm).await
}
