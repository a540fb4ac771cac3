use rs_pickplace_arm::config::SimulationConfig;
use rs_pickplace_arm::kinematic_traits::{Kinematics, HOME, JOINT_NAMES};
use rs_pickplace_arm::kinematics_impl::ArmKinematics;
use rs_pickplace_arm::simulation::{Command, JogInput, Simulation};
use rs_pickplace_arm::utils::{dump_joints, dump_pose};

/// Usage example.
fn main() {
    let robot = ArmKinematics::default();
    println!("Home pose:");
    dump_joints(&HOME);
    let poses = robot.forward_with_joint_poses(&HOME);
    for (name, pose) in JOINT_NAMES[1..].iter().zip(poses.iter()) {
        dump_pose(name, pose);
    }

    // One pass: pick the cube at zone A, carry it over and drop it at zone B.
    let mut sim = Simulation::new(SimulationConfig::default());
    sim.apply(Command::StartForward);
    let idle = JogInput::default();
    let dt = 1.0 / 60.0;
    let mut ticks = 0;
    while sim.animator().is_running() && ticks < 10_000 {
        sim.tick(dt, &idle);
        ticks += 1;
    }
    println!("{} after {} ticks", sim.status(), ticks);
    dump_pose("Cube", &sim.object_pose());
    println!("Gripper is {}", sim.gripper_label());
}
