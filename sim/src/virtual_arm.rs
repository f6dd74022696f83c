use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use sagittarius::commands::*;
use sagittarius::kinematics::{JointVector, KinematicsModel, Pose};
use sagittarius::packets::{CommandCode, ServoRequest, ServoResponse};
use sagittarius::units::wire_to_radians;
use sagittarius::{ServoTelemetry, TorqueMode, GRIPPER_SERVO_ID, SERVO_COUNT};

use crate::BusConfig;

/// State of a simulated servo board and the seven servos behind it.
///
/// Servos hold the last commanded position. While torque is free they are
/// limp, so position commands are recorded in the request log but do not
/// move them. Muted servos never answer queries.
///
/// Only the most recent requests are kept in the log; per-command counts
/// cover the whole session.
#[derive(Debug, Clone)]
pub struct VirtualArm {
    positions: [i16; SERVO_COUNT],
    torque: TorqueMode,
    velocity: u16,
    acceleration: u8,
    torque_limits: [i16; SERVO_COUNT],
    telemetry: ServoTelemetry,
    muted: HashSet<u8>,
    requests: VecDeque<ServoRequest>,
    log_capacity: usize,
    counts: HashMap<CommandCode, usize>,
    rejected_frames: usize,
    model: KinematicsModel,
}

impl Default for VirtualArm {
    fn default() -> Self {
        Self::new(&BusConfig::default())
    }
}

impl VirtualArm {
    pub fn new(config: &BusConfig) -> Self {
        let [x, y, z] = config.origin;
        Self {
            positions: [0; SERVO_COUNT],
            torque: TorqueMode::Free,
            velocity: 0,
            acceleration: 0,
            torque_limits: [1000; SERVO_COUNT],
            telemetry: config.telemetry,
            muted: config.muted_ids.iter().copied().collect(),
            requests: VecDeque::new(),
            log_capacity: config.request_log_capacity,
            counts: HashMap::new(),
            rejected_frames: 0,
            model: KinematicsModel::sagittarius_at(x, y, z),
        }
    }

    /// Applies one request and returns the reply the board would send, if any.
    pub fn handle(&mut self, request: ServoRequest) -> Option<ServoResponse> {
        self.record(&request);
        match request {
            ServoRequest::SetAllPositions(cmd) => {
                if self.accepts_motion() {
                    self.positions[..6].copy_from_slice(&cmd.tenth_degrees);
                    debug!(pose = ?self.tool_pose().position(), "joints moved");
                }
                None
            }
            ServoRequest::SetPositionsById(cmd) => {
                if self.accepts_motion() {
                    for p in cmd.positions {
                        match Self::slot(p.id) {
                            Some(slot) => self.positions[slot] = p.tenth_degrees,
                            None => warn!(id = p.id, "position for unknown servo ignored"),
                        }
                    }
                }
                None
            }
            ServoRequest::ControlTorque(cmd) => {
                self.torque = cmd.mode;
                debug!(torque = %cmd.mode, "torque switched");
                None
            }
            ServoRequest::SetVelocity(cmd) => {
                self.velocity = cmd.velocity;
                None
            }
            ServoRequest::SetAcceleration(cmd) => {
                self.acceleration = cmd.acceleration;
                None
            }
            ServoRequest::SetTorqueLimits(cmd) => {
                self.torque_limits = cmd.limits;
                None
            }
            ServoRequest::GetServoInfo(query) => {
                let slot = self.answering(query.id)?;
                let mut telemetry = self.telemetry;
                if self.torque == TorqueMode::Free {
                    telemetry.load = 0;
                }
                debug!(id = query.id, slot, "servo info requested");
                Some(ServoResponse::ServoInfo(GetServoInfoResponse {
                    id: query.id,
                    telemetry,
                }))
            }
            ServoRequest::ReadPosition(query) => {
                let slot = self.answering(query.id)?;
                Some(ServoResponse::Position(ReadPositionResponse {
                    id: query.id,
                    tenth_degrees: self.positions[slot],
                }))
            }
        }
    }

    fn record(&mut self, request: &ServoRequest) {
        *self.counts.entry(request.command()).or_insert(0) += 1;
        if self.log_capacity == 0 {
            return;
        }
        if self.requests.len() == self.log_capacity {
            self.requests.pop_front();
        }
        self.requests.push_back(request.clone());
    }

    /// Counts a frame that arrived but could not be decoded.
    pub fn record_rejected_frame(&mut self) {
        self.rejected_frames += 1;
    }

    pub fn rejected_frames(&self) -> usize {
        self.rejected_frames
    }

    fn accepts_motion(&self) -> bool {
        if self.torque == TorqueMode::Free {
            debug!("servos are free; motion ignored");
            return false;
        }
        true
    }

    fn slot(id: u8) -> Option<usize> {
        (1..=GRIPPER_SERVO_ID).contains(&id).then(|| usize::from(id - 1))
    }

    /// Slot of a servo that will answer, or `None` if it stays silent.
    fn answering(&self, id: u8) -> Option<usize> {
        if self.muted.contains(&id) {
            debug!(id, "muted servo stays silent");
            return None;
        }
        Self::slot(id)
    }

    pub fn mute(&mut self, id: u8) {
        self.muted.insert(id);
    }

    pub fn unmute(&mut self, id: u8) {
        self.muted.remove(&id);
    }

    pub fn torque_mode(&self) -> TorqueMode {
        self.torque
    }

    pub fn velocity(&self) -> u16 {
        self.velocity
    }

    pub fn acceleration(&self) -> u8 {
        self.acceleration
    }

    pub fn torque_limits(&self) -> [i16; SERVO_COUNT] {
        self.torque_limits
    }

    /// Servo angles in radians, gripper servo last.
    pub fn positions(&self) -> [f64; SERVO_COUNT] {
        self.positions.map(wire_to_radians)
    }

    pub fn joints(&self) -> JointVector {
        let p = self.positions();
        JointVector::new([p[0], p[1], p[2], p[3], p[4], p[5]])
    }

    pub fn tool_pose(&self) -> Pose {
        self.model.compute_pose(&self.joints())
    }

    /// Most recent decoded requests, oldest first.
    pub fn requests(&self) -> impl Iterator<Item = &ServoRequest> {
        self.requests.iter()
    }

    /// Requests of one kind decoded since start or the last clear.
    pub fn count(&self, command: CommandCode) -> usize {
        self.counts.get(&command).copied().unwrap_or(0)
    }

    pub fn clear_requests(&mut self) {
        self.requests.clear();
        self.counts.clear();
        self.rejected_frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked() -> VirtualArm {
        let mut arm = VirtualArm::default();
        arm.handle(ServoRequest::ControlTorque(ControlTorque::new(TorqueMode::Locked)));
        arm
    }

    #[test]
    fn test_free_servos_do_not_move() {
        let mut arm = VirtualArm::default();
        arm.handle(ServoRequest::SetAllPositions(SetAllPositions::new([100; 6])));
        assert_eq!(arm.positions(), [0.0; 7]);
        assert_eq!(arm.count(CommandCode::SetAllPositions), 1);
    }

    #[test]
    fn test_position_query_reports_last_command() {
        let mut arm = locked();
        arm.handle(ServoRequest::SetPositionsById(SetPositionsById::new(vec![ServoPosition {
            id: 7,
            tenth_degrees: 859,
        }])));
        let reply = arm.handle(ServoRequest::ReadPosition(ReadPosition::new(7)));
        assert_eq!(
            reply,
            Some(ServoResponse::Position(ReadPositionResponse { id: 7, tenth_degrees: 859 }))
        );
    }

    #[test]
    fn test_muted_and_unknown_servos_are_silent() {
        let mut arm = locked();
        arm.mute(2);
        assert!(arm.handle(ServoRequest::GetServoInfo(GetServoInfo::new(2))).is_none());
        assert!(arm.handle(ServoRequest::GetServoInfo(GetServoInfo::new(9))).is_none());
        arm.unmute(2);
        assert!(arm.handle(ServoRequest::GetServoInfo(GetServoInfo::new(2))).is_some());
    }

    #[test]
    fn test_home_tool_pose() {
        let arm = locked();
        let [x, y, z] = arm.tool_pose().position();
        assert!((x - 0.3065).abs() < 1e-12);
        assert!(y.abs() < 1e-12);
        assert!((z - 0.304).abs() < 1e-12);
    }

    #[test]
    fn test_request_log_is_bounded_but_counts_are_not() {
        let config = BusConfig {
            request_log_capacity: 4,
            ..BusConfig::default()
        };
        let mut arm = VirtualArm::new(&config);
        for _ in 0..10 {
            arm.handle(ServoRequest::ReadPosition(ReadPosition::new(1)));
        }
        arm.handle(ServoRequest::GetServoInfo(GetServoInfo::new(2)));

        assert_eq!(arm.requests().count(), 4);
        assert_eq!(
            arm.requests().last(),
            Some(&ServoRequest::GetServoInfo(GetServoInfo::new(2)))
        );
        assert_eq!(arm.count(CommandCode::ReadPosition), 10);

        arm.clear_requests();
        assert_eq!(arm.requests().count(), 0);
        assert_eq!(arm.count(CommandCode::ReadPosition), 0);
    }
}
