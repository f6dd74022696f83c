mod control_torque;
mod get_servo_info;
mod read_position;
mod set_acceleration;
mod set_all_positions;
mod set_positions_by_id;
mod set_torque_limits;
mod set_velocity;

pub use control_torque::*;
pub use get_servo_info::*;
pub use read_position::*;
pub use set_acceleration::*;
pub use set_all_positions::*;
pub use set_positions_by_id::*;
pub use set_torque_limits::*;
pub use set_velocity::*;
