use std::sync::{Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use super::{validate_servo_id, ArmConfig, BusReply, JointStatus, ServoTransport};
use crate::commands::*;
use crate::kinematics::{JointLimits, JointVector, LimitSide};
use crate::packets::ServoRequest;
use crate::units::{gripper_angle_to_position, gripper_position_to_angle, GRIPPER_CLOSED, GRIPPER_CLOSED_ANGLE, GRIPPER_OPEN};
use crate::{ArmError, ServoCommand, ServoTelemetry, TorqueMode, GRIPPER_SERVO_ID, MAX_INDEXED_SERVOS, SERVO_COUNT};

#[derive(Debug, Clone)]
struct SessionState {
    torque: TorqueMode,
    velocity: u16,
    acceleration: u8,
    free_on_release: bool,
    last_status: [f64; SERVO_COUNT],
    closed: bool,
}

/// A connected Sagittarius arm.
///
/// Joint writes are checked against the session's joint limits before
/// anything reaches the bus; a command with one bad axis is rejected whole.
/// Reads that go unanswered come back as [`BusReply::TimedOut`] or
/// [`JointStatus::Incomplete`] rather than as errors.
///
/// End the session with [`close`](Self::close). If `free_on_release` is set,
/// torque is released first. A session that is simply dropped makes a best
/// effort to do the same on the current tokio runtime.
///
/// # Example
///
/// ```rust,ignore
/// let arm = SagittariusArm::connect(ArmConfig::default()).await?;
/// arm.set_all_joints_radian(&JointVector::new([0.0, 0.3, -0.2, 0.0, 0.5, 0.0])).await?;
/// arm.set_gripper_linear_position(-0.034).await?;
/// match arm.get_current_joint_status().await? {
///     JointStatus::Complete(values) => println!("{:?}", values),
///     JointStatus::Incomplete { missing, .. } => println!("no answer from {:?}", missing),
/// }
/// arm.close().await?;
/// ```
pub struct SagittariusArm {
    config: ArmConfig,
    transport: ServoTransport,
    limits: JointLimits,
    state: StdMutex<SessionState>,
}

impl SagittariusArm {
    /// Opens the serial device named in `config` and brings the arm up.
    pub async fn connect(config: ArmConfig) -> Result<Self, ArmError> {
        config.validate()?;
        let transport = ServoTransport::open_serial(&config.serial_path, config.baud_rate)?;
        Self::start(transport, config).await
    }

    /// Same as [`connect`](Self::connect) but over TCP to a virtual bus.
    pub async fn connect_tcp(addr: &str, config: ArmConfig) -> Result<Self, ArmError> {
        config.validate()?;
        let transport = ServoTransport::connect_tcp(addr).await?;
        Self::start(transport, config).await
    }

    pub async fn from_stream<S>(stream: S, config: ArmConfig) -> Result<Self, ArmError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        config.validate()?;
        Self::start(ServoTransport::from_stream(stream), config).await
    }

    /// Sends the default velocity, acceleration and the initial torque mode.
    async fn start(transport: ServoTransport, config: ArmConfig) -> Result<Self, ArmError> {
        let state = SessionState {
            torque: config.initial_torque,
            velocity: config.velocity,
            acceleration: config.acceleration,
            free_on_release: config.free_on_release,
            last_status: [0.0; SERVO_COUNT],
            closed: false,
        };
        let arm = Self {
            limits: config.joint_limits.clone(),
            config,
            transport,
            state: StdMutex::new(state),
        };

        arm.set_servo_velocity(arm.config.velocity).await?;
        arm.set_servo_acceleration(arm.config.acceleration).await?;
        arm.control_torque(arm.config.initial_torque).await?;
        info!(
            velocity = arm.config.velocity,
            acceleration = arm.config.acceleration,
            torque = %arm.config.initial_torque,
            "arm session started"
        );
        Ok(arm)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    pub fn joint_limits(&self) -> &JointLimits {
        &self.limits
    }

    pub fn torque_mode(&self) -> TorqueMode {
        self.state().torque
    }

    pub fn velocity(&self) -> u16 {
        self.state().velocity
    }

    pub fn acceleration(&self) -> u8 {
        self.state().acceleration
    }

    pub fn free_after_release(&self) -> bool {
        self.state().free_on_release
    }

    /// Whether ending the session releases torque.
    pub fn set_free_after_release(&self, free: bool) {
        self.state().free_on_release = free;
    }

    pub fn transport(&self) -> &ServoTransport {
        &self.transport
    }

    /// True if every joint is within limits.
    pub fn check_upper_lower(&self, joints: &JointVector) -> bool {
        self.limits.contains(joints)
    }

    /// True if every addressed servo's target is within its limits.
    ///
    /// Fails for more than six commands or an unknown servo id.
    pub fn check_upper_lower_with_index(&self, commands: &[ServoCommand]) -> Result<bool, ArmError> {
        match self.validate_indexed(commands) {
            Ok(()) => Ok(true),
            Err(ArmError::JointLimit { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn validate_indexed(&self, commands: &[ServoCommand]) -> Result<(), ArmError> {
        if commands.len() > MAX_INDEXED_SERVOS {
            return Err(ArmError::TooManyServos {
                max: MAX_INDEXED_SERVOS,
                got: commands.len(),
            });
        }
        for command in commands {
            validate_servo_id(command.id)?;
        }
        commands.iter().try_for_each(|c| self.check_servo(c))
    }

    fn check_servo(&self, command: &ServoCommand) -> Result<(), ArmError> {
        let (lower, upper, outcome) = if command.id == GRIPPER_SERVO_ID {
            let v = command.value;
            let outcome = if !(v >= 0.0) {
                Err(LimitSide::Lower)
            } else if !(v <= GRIPPER_CLOSED_ANGLE) {
                Err(LimitSide::Upper)
            } else {
                Ok(())
            };
            (0.0, GRIPPER_CLOSED_ANGLE, outcome)
        } else {
            let joint = usize::from(command.id - 1);
            (
                self.limits.lower()[joint],
                self.limits.upper()[joint],
                self.limits.check_joint(joint, command.value),
            )
        };
        outcome.map_err(|side| ArmError::JointLimit {
            joint: command.id,
            value: command.value,
            lower,
            upper,
            side,
        })
    }

    /// Moves all six joints. Nothing is sent if any joint is out of limits.
    pub async fn set_all_joints_radian(&self, joints: &JointVector) -> Result<(), ArmError> {
        if let Some(violation) = self.limits.first_violation(joints) {
            warn!("rejected joint command: {}", violation);
            return Err(violation);
        }
        debug!(?joints, "moving all joints");
        self.transport
            .send(&ServoRequest::SetAllPositions(SetAllPositions::from_joints(joints)))
            .await
    }

    /// Moves up to six servos by id, gripper included (angle in radians).
    ///
    /// The whole batch is rejected if any entry fails its limit check.
    pub async fn set_joints_by_index(&self, commands: &[ServoCommand]) -> Result<(), ArmError> {
        if let Err(e) = self.validate_indexed(commands) {
            warn!("rejected indexed command: {}", e);
            return Err(e);
        }
        if commands.is_empty() {
            return Ok(());
        }
        self.transport.write_servo_batch(commands).await
    }

    /// Opens or closes the gripper; `position` runs from 0.0 (open) to -0.068 m (closed).
    pub async fn set_gripper_linear_position(&self, position: f64) -> Result<(), ArmError> {
        if !(GRIPPER_CLOSED..=GRIPPER_OPEN).contains(&position) {
            return Err(ArmError::out_of_range(
                "gripper position",
                position,
                GRIPPER_CLOSED,
                GRIPPER_OPEN,
            ));
        }
        let angle = gripper_position_to_angle(position);
        debug!(position, angle, "moving gripper");
        self.transport
            .write_servo(ServoCommand::new(GRIPPER_SERVO_ID, angle))
            .await
    }

    /// Polls the six joints and the gripper.
    ///
    /// Servos that do not answer within the read timeout keep their last
    /// known value and are listed in [`JointStatus::Incomplete`].
    pub async fn get_current_joint_status(&self) -> Result<JointStatus, ArmError> {
        let timeout = self.config.read_timeout();
        let mut values = self.state().last_status;
        let mut missing = Vec::new();

        for id in 1..=GRIPPER_SERVO_ID {
            let slot = usize::from(id - 1);
            match self.transport.read_position(id, timeout).await? {
                BusReply::Received(angle) if id == GRIPPER_SERVO_ID => {
                    values[slot] = gripper_angle_to_position(angle);
                }
                BusReply::Received(angle) => values[slot] = angle,
                BusReply::TimedOut => missing.push(id),
            }
        }

        self.state().last_status = values;
        if missing.is_empty() {
            Ok(JointStatus::Complete(values))
        } else {
            warn!(?missing, "joint status incomplete");
            Ok(JointStatus::Incomplete {
                best_effort: values,
                missing,
            })
        }
    }

    /// Frees or locks every servo. Repeating the current mode is harmless and still sent.
    pub async fn control_torque(&self, mode: TorqueMode) -> Result<(), ArmError> {
        self.transport
            .send(&ServoRequest::ControlTorque(ControlTorque::new(mode)))
            .await?;
        self.state().torque = mode;
        info!(torque = %mode, "torque mode set");
        Ok(())
    }

    /// [`control_torque`](Self::control_torque) taking `"free"` or `"lock"`.
    pub async fn control_torque_str(&self, mode: &str) -> Result<(), ArmError> {
        self.control_torque(mode.parse()?).await
    }

    pub async fn get_servo_info(&self, id: u8, timeout: Duration) -> Result<BusReply<ServoTelemetry>, ArmError> {
        self.transport.read_servo_status(id, timeout).await
    }

    pub async fn set_servo_acceleration(&self, acceleration: u8) -> Result<(), ArmError> {
        let cmd = SetAcceleration::new(acceleration)?;
        self.transport.send(&ServoRequest::SetAcceleration(cmd)).await?;
        self.state().acceleration = acceleration;
        Ok(())
    }

    pub async fn set_servo_velocity(&self, velocity: u16) -> Result<(), ArmError> {
        let cmd = SetVelocity::new(velocity)?;
        self.transport.send(&ServoRequest::SetVelocity(cmd)).await?;
        self.state().velocity = velocity;
        Ok(())
    }

    /// Torque limits for all seven servos, per-mille of rated torque.
    pub async fn set_servo_torque(&self, limits: &[i16]) -> Result<(), ArmError> {
        let cmd = SetTorqueLimits::from_slice(limits)?;
        self.transport.send(&ServoRequest::SetTorqueLimits(cmd)).await
    }

    /// Ends the session, releasing torque first if `free_on_release` is set.
    pub async fn close(self) -> Result<(), ArmError> {
        let free = {
            let mut state = self.state();
            state.closed = true;
            state.free_on_release
        };
        let result = if free {
            info!("releasing torque before closing");
            self.control_torque(TorqueMode::Free).await
        } else {
            info!(torque = %self.torque_mode(), "closing with torque left as is");
            Ok(())
        };
        self.transport.shutdown().await;
        result
    }
}

impl Drop for SagittariusArm {
    fn drop(&mut self) {
        let (closed, free) = {
            let state = self.state();
            (state.closed, state.free_on_release)
        };
        if closed {
            return;
        }
        if !free || !self.transport.is_connected() {
            self.transport.close_reader();
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let transport = self.transport.clone();
                handle.spawn(async move {
                    let request = ServoRequest::ControlTorque(ControlTorque::new(TorqueMode::Free));
                    if let Err(e) = transport.send(&request).await {
                        warn!("could not release torque on drop: {}", e);
                    }
                    transport.shutdown().await;
                });
            }
            Err(_) => {
                warn!("arm dropped outside a tokio runtime; torque was not released");
                self.transport.close_reader();
            }
        }
    }
}
