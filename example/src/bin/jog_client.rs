// Interactive Cartesian jogging through inverse kinematics
// Run with: cargo run -p example --bin jog_client
// Make sure the simulator is running: cargo run -p sim

use std::io::{self, Write};

use sagittarius::{
    drivers::{ArmConfig, SagittariusArm},
    kinematics::{EulerPose, IkOutcome, JointVector, KinematicsModel, Pose},
    units::{GRIPPER_CLOSED, GRIPPER_OPEN},
    ArmError, TorqueMode,
};

const INITIAL_POSITION: EulerPose = EulerPose {
    xyz: [0.3, 0.0, 0.3],
    rpy: [0.0, 0.0, 0.0],
};

#[derive(Debug, Clone)]
struct JogConfig {
    step_distance: f64, // m
    step_angle: f64,    // rad
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            step_distance: 0.01,
            step_angle: 5.0_f64.to_radians(),
        }
    }
}

struct JogState {
    target: EulerPose,
    joints: JointVector,
    gripper: f64,
}

#[tokio::main]
async fn main() -> Result<(), ArmError> {
    println!("=== Sagittarius Interactive Jogging Client ===\n");

    let addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:16001".to_string());
    println!("Connecting to servo bus at {}...", addr);
    let arm = SagittariusArm::connect_tcp(&addr, ArmConfig::default()).await?;
    arm.set_free_after_release(false);

    let model = KinematicsModel::sagittarius();
    let mut config = JogConfig::default();
    let mut state = JogState {
        target: INITIAL_POSITION,
        joints: arm.get_current_joint_status().await?.joints(),
        gripper: GRIPPER_OPEN,
    };
    if !move_to(&arm, &model, &mut state, INITIAL_POSITION).await? {
        println!("Initial position is unreachable from the current pose");
    }

    println!("\n✓ Connected!\n");

    loop {
        display_status(&config, &state, arm.torque_mode());
        print_help();

        let input = prompt("\nCommand: ");
        let Some(cmd) = input.chars().next() else {
            continue;
        };

        match cmd {
            'q' => {
                println!("\nShutting down...");
                break;
            }
            'd' => match prompt("Enter step distance (m): ").parse::<f64>() {
                Ok(d) if d > 0.0 && d <= 0.1 => config.step_distance = d,
                _ => println!("Distance must be between 0 and 0.1 m"),
            },
            'a' => match prompt("Enter step angle (deg): ").parse::<f64>() {
                Ok(a) if a > 0.0 && a <= 45.0 => config.step_angle = a.to_radians(),
                _ => println!("Angle must be between 0 and 45 degrees"),
            },
            'g' => {
                state.gripper = if state.gripper == GRIPPER_OPEN { GRIPPER_CLOSED } else { GRIPPER_OPEN };
                if let Err(e) = arm.set_gripper_linear_position(state.gripper).await {
                    println!("Gripper error: {}", e);
                }
            }
            't' => {
                let mode = match arm.torque_mode() {
                    TorqueMode::Free => TorqueMode::Locked,
                    TorqueMode::Locked => TorqueMode::Free,
                };
                arm.control_torque(mode).await?;
            }
            'r' => {
                move_to(&arm, &model, &mut state, INITIAL_POSITION).await?;
            }
            'k' | 'j' | 'h' | 'l' | 'f' | 'b' | 'p' | 'P' | 'y' | 'Y' => {
                let next = jog(&state.target, cmd, &config);
                println!("→ {}", get_direction_name(cmd));
                move_to(&arm, &model, &mut state, next).await?;
            }
            _ => println!("Unknown command: '{}'", cmd),
        }
    }

    arm.close().await?;
    println!("Disconnected.");
    Ok(())
}

fn prompt(text: &str) -> String {
    print!("{}", text);
    let _ = io::stdout().flush();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim().to_string()
}

/// Solves IK for `target` seeded with the last commanded joints and moves there.
async fn move_to(
    arm: &SagittariusArm,
    model: &KinematicsModel,
    state: &mut JogState,
    target: EulerPose,
) -> Result<bool, ArmError> {
    let pose = match Pose::try_from(target) {
        Ok(pose) => pose,
        Err(e) => {
            println!("Invalid target: {}", e);
            return Ok(false);
        }
    };
    match model.solve(&pose, 0.001, 0.001, &state.joints) {
        IkOutcome::Converged { joints, iterations } => {
            if !arm.check_upper_lower(&joints) {
                println!("Target needs joints outside their limits");
                return Ok(false);
            }
            arm.set_all_joints_radian(&joints).await?;
            println!("✓ Moved in {} IK iterations", iterations);
            state.joints = joints;
            state.target = target;
            Ok(true)
        }
        IkOutcome::NotConverged { position_error, .. } => {
            println!("Cannot reach target (position error {:.4} m)", position_error);
            Ok(false)
        }
    }
}

fn jog(current: &EulerPose, key: char, config: &JogConfig) -> EulerPose {
    let mut next = *current;
    let (d, a) = (config.step_distance, config.step_angle);
    match key {
        'k' => next.xyz[2] += d,
        'j' => next.xyz[2] -= d,
        'h' => next.xyz[1] -= d,
        'l' => next.xyz[1] += d,
        'f' => next.xyz[0] += d,
        'b' => next.xyz[0] -= d,
        'p' => next.rpy[1] += a,
        'P' => next.rpy[1] -= a,
        'y' => next.rpy[2] += a,
        'Y' => next.rpy[2] -= a,
        _ => {}
    }
    next
}

fn display_status(config: &JogConfig, state: &JogState, torque: TorqueMode) {
    let [x, y, z] = state.target.xyz;
    let [_, pitch, yaw] = state.target.rpy;
    println!("\n╔════════════════════════════════════════╗");
    println!("║           JOGGING STATUS               ║");
    println!("╠════════════════════════════════════════╣");
    println!("║ Target X/Y/Z: {:>6.3} {:>6.3} {:>6.3} m  ║", x, y, z);
    println!("║ Pitch/Yaw:    {:>8.1} {:>8.1} deg   ║", pitch.to_degrees(), yaw.to_degrees());
    println!("║ Step:         {:>6.3} m {:>6.1} deg    ║", config.step_distance, config.step_angle.to_degrees());
    println!("║ Gripper:      {:>8.3} m             ║", state.gripper);
    println!("║ Torque:       {:>8}               ║", torque);
    println!("╚════════════════════════════════════════╝");
}

fn print_help() {
    println!("\n┌─────────────────────────────────────────┐");
    println!("│ MOTION CONTROLS:                        │");
    println!("│  k = Up    (+Z)    j = Down   (-Z)      │");
    println!("│  h = Left  (-Y)    l = Right  (+Y)      │");
    println!("│  f = Forward (+X)  b = Backward (-X)    │");
    println!("│  p/P = Pitch +/-   y/Y = Yaw +/-        │");
    println!("│                                         │");
    println!("│ ARM:                                    │");
    println!("│  g = Toggle gripper                     │");
    println!("│  t = Toggle torque                      │");
    println!("│  r = Return to initial position         │");
    println!("│                                         │");
    println!("│ CONFIGURATION:                          │");
    println!("│  d = Set step distance                  │");
    println!("│  a = Set step angle                     │");
    println!("│                                         │");
    println!("│ OTHER:                                  │");
    println!("│  q = Quit                               │");
    println!("└─────────────────────────────────────────┘");
}

fn get_direction_name(key: char) -> &'static str {
    match key {
        'k' => "Up (+Z)",
        'j' => "Down (-Z)",
        'h' => "Left (-Y)",
        'l' => "Right (+Y)",
        'f' => "Forward (+X)",
        'b' => "Backward (-X)",
        'p' => "Pitch +",
        'P' => "Pitch -",
        'y' => "Yaw +",
        'Y' => "Yaw -",
        _ => "Unknown",
    }
}
