//! Settings for a simulated servo board.

use serde::{Deserialize, Serialize};

use sagittarius::ServoTelemetry;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Address the binary listens on.
    pub listen_addr: String,

    /// Telemetry every servo reports while torque is locked.
    pub telemetry: ServoTelemetry,

    /// Servo ids that never answer queries.
    pub muted_ids: Vec<u8>,

    /// Mounting offset passed to the kinematics model used for logging the tool pose.
    pub origin: [f64; 3],

    /// Most recent requests kept for inspection. 0 disables the log.
    pub request_log_capacity: usize,
}

impl BusConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:16001".to_string(),
            telemetry: ServoTelemetry {
                speed: 0,
                load: 12,
                voltage: 120,
                current: 180,
            },
            muted_ids: Vec::new(),
            origin: [0.0; 3],
            request_log_capacity: 256,
        }
    }
}
