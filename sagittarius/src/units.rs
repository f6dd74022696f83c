//! Conversions between engineering units and the servo board's wire units.
//!
//! Angles travel as signed tenths of a degree. The gripper is driven by a
//! rotary servo whose angle maps linearly onto finger displacement.

/// Fully open gripper displacement (meters).
pub const GRIPPER_OPEN: f64 = 0.0;
/// Fully closed gripper displacement (meters).
pub const GRIPPER_CLOSED: f64 = -0.068;
/// Gripper servo angle at the fully closed position (radians).
pub const GRIPPER_CLOSED_ANGLE: f64 = 1.5;

/// Radians to tenths of a degree, saturating at the i16 range.
pub fn radians_to_wire(radians: f64) -> i16 {
    let tenths = (radians.to_degrees() * 10.0).round();
    tenths.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

pub fn wire_to_radians(tenth_degrees: i16) -> f64 {
    (f64::from(tenth_degrees) / 10.0).to_radians()
}

/// Gripper displacement in `[-0.068, 0.0]` m to gripper servo angle in `[0, 1.5]` rad.
pub fn gripper_position_to_angle(position: f64) -> f64 {
    position / GRIPPER_CLOSED * GRIPPER_CLOSED_ANGLE
}

pub fn gripper_angle_to_position(angle: f64) -> f64 {
    angle / GRIPPER_CLOSED_ANGLE * GRIPPER_CLOSED
}
