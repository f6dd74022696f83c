//! Arm kinematics: geometric model, forward kinematics and numerical IK.
//!
//! Everything here is pure computation with no I/O, so a
//! [`KinematicsModel`] can be shared between threads and called concurrently.

mod inverse;
mod joints;
mod model;
mod pose;
pub mod screw;

pub use inverse::*;
pub use joints::*;
pub use model::*;
pub use pose::*;
