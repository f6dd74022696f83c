// Scripted tour of the SDK against a real arm or the simulator
// Run with: cargo run -p example --bin demo                    (simulator on 127.0.0.1:16001)
//           cargo run -p example --bin demo -- --serial /dev/ttyACM0

use std::time::Duration;

use sagittarius::{
    drivers::{ArmConfig, BusReply, JointStatus, SagittariusArm},
    kinematics::{JointVector, KinematicsModel, Pose},
    logging::{init_logging, log_set_level},
    ArmError, ServoCommand,
};
use tokio::time::sleep;

async fn connect() -> Result<SagittariusArm, ArmError> {
    let args: Vec<String> = std::env::args().collect();
    let config = ArmConfig::new("/dev/ttyACM0".to_string(), 1_000_000, 500, 5);

    match args.get(1).map(String::as_str) {
        Some("--serial") => {
            let path = args.get(2).cloned().unwrap_or(config.serial_path.clone());
            SagittariusArm::connect(ArmConfig { serial_path: path, ..config }).await
        }
        Some(addr) => SagittariusArm::connect_tcp(addr, config).await,
        None => SagittariusArm::connect_tcp("127.0.0.1:16001", config).await,
    }
}

fn print_status(status: &JointStatus) {
    match status {
        JointStatus::Complete(values) => println!("Current joint status: {:?}", values),
        JointStatus::Incomplete { best_effort, missing } => {
            println!("Partial joint status (no answer from {:?}): {:?}", missing, best_effort)
        }
    }
}

async fn move_to(arm: &SagittariusArm, model: &KinematicsModel, target: &Pose) -> Result<bool, ArmError> {
    let guess = arm.get_current_joint_status().await?.joints();
    let outcome = model.solve(target, 0.001, 0.001, &guess);
    match outcome.converged() {
        Some(joints) if arm.check_upper_lower(&joints) => {
            arm.set_all_joints_radian(&joints).await?;
            Ok(true)
        }
        Some(joints) => {
            println!("IK solution {:?} is outside the joint limits", joints);
            Ok(false)
        }
        None => {
            println!("IK did not converge for {:?}", target.position());
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ArmError> {
    init_logging()?;
    log_set_level(3)?;

    let arm = connect().await?;
    let kinematics = KinematicsModel::sagittarius_at(0.0, 0.0, 0.0);

    // Keep the arm powered after the demo exits.
    arm.set_free_after_release(false);
    println!("Sagittarius driver is running");

    print_status(&arm.get_current_joint_status().await?);

    arm.set_gripper_linear_position(0.0).await?;
    sleep(Duration::from_secs(1)).await;

    let mut joints = JointVector::zeros();
    joints.0[5] = 1.576;
    arm.set_all_joints_radian(&joints).await?;
    sleep(Duration::from_secs(1)).await;

    arm.set_all_joints_radian(&JointVector::zeros()).await?;
    sleep(Duration::from_secs(1)).await;

    let servos = [
        ServoCommand::new(1, 0.45),
        ServoCommand::new(2, 0.45),
        ServoCommand::new(3, 0.55),
        ServoCommand::new(4, 1.55),
    ];
    arm.set_joints_by_index(&servos).await?;
    sleep(Duration::from_secs(1)).await;

    arm.set_gripper_linear_position(-0.068).await?;
    sleep(Duration::from_secs(2)).await;

    if let BusReply::Received(info) = arm.get_servo_info(2, Duration::from_millis(200)).await? {
        println!(
            "Servo No.2 info: speed={}, payload={}%, voltage={}V, current={}mA",
            info.speed, info.load, info.voltage, info.current
        );
    }

    let target = Pose::from_euler_degrees([0.3, 0.0, 0.1], [0.0, 45.0, 0.0])?;
    if move_to(&arm, &kinematics, &target).await? {
        sleep(Duration::from_secs(2)).await;
        let status = arm.get_current_joint_status().await?;
        let pose = kinematics.fk_euler(&status.joints());
        println!(
            "Current position: x={:.4}, y={:.4}, z={:.4}",
            pose.xyz[0], pose.xyz[1], pose.xyz[2]
        );
        println!(
            "Current orientation: roll={:.4}, pitch={:.4}, yaw={:.4}",
            pose.rpy[0], pose.rpy[1], pose.rpy[2]
        );
    }

    let target = Pose::from_quaternion([0.3, 0.0, 0.1], [0.0, 0.7068252, 0.0, 0.7073883])?;
    if move_to(&arm, &kinematics, &target).await? {
        sleep(Duration::from_secs(2)).await;
    }

    for (xyz, rpy) in [([0.2, 0.2, 0.2], [0.0, 0.0, 45.0]), ([0.3, 0.0, 0.3], [0.0, 0.0, 0.0])] {
        let target = Pose::from_euler_degrees(xyz, rpy)?;
        if move_to(&arm, &kinematics, &target).await? {
            sleep(Duration::from_secs(2)).await;
        }
    }

    arm.close().await
}
