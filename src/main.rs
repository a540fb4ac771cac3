//! Headless runner of the pick-and-place simulation.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rs_pickplace_arm::animator::AnimatorEvent;
use rs_pickplace_arm::config::SimulationConfig;
use rs_pickplace_arm::picking::{PickState, PickTransition, ReleasePolicy};
use rs_pickplace_arm::settling::{FreeBody, StepOutcome};
use rs_pickplace_arm::simulation::{Command, JogInput, Simulation};
use rs_pickplace_arm::utils::{joints_to_string, pose_to_string, random_rotation};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Pick and place back and forth until the tick budget is used up.
    Loop,
    /// One pass from zone A to zone B.
    Forward,
    /// One pass from zone B to zone A.
    Backward,
    /// Drop the cube from random orientations and report the face it rests on.
    Drop,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Release {
    /// The cube can be released anywhere and falls.
    Allow,
    /// Opening the gripper high above the ground is refused.
    Veto,
}

#[derive(Parser, Debug)]
#[command(name = "pickplace")]
#[command(about = "Runs the 5-joint arm pick-and-place simulation without rendering", long_about = None)]
#[command(version)]
struct Args {
    /// YAML configuration file. Built-in defaults are used when not given.
    #[arg(long)]
    config: Option<String>,

    /// Maximal number of ticks to simulate.
    #[arg(long, default_value_t = 5000)]
    ticks: usize,

    /// Frame delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    #[arg(long, value_enum, default_value = "forward")]
    mode: Mode,

    /// Overrides the release policy of the configuration.
    #[arg(long, value_enum)]
    release_policy: Option<Release>,

    /// Number of drops in drop mode.
    #[arg(long, default_value_t = 10)]
    drops: usize,

    /// Random seed for drop mode.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rs_pickplace_arm=info".parse()?)
                .add_directive("warn".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => SimulationConfig::default(),
    };
    match args.release_policy {
        Some(Release::Allow) => config.picking.release_policy = ReleasePolicy::AllowMidAir,
        Some(Release::Veto) => {
            config.picking.release_policy = SimulationConfig::no_mid_air_release().picking.release_policy
        }
        None => {}
    }

    match args.mode {
        Mode::Drop => run_drops(&config, &args),
        Mode::Loop => run_sequence(config, &args, Command::Start),
        Mode::Forward => run_sequence(config, &args, Command::StartForward),
        Mode::Backward => run_sequence(config, &args, Command::StartBackward),
    }
}

fn run_sequence(config: SimulationConfig, args: &Args, start: Command) -> Result<()> {
    let mut sim = Simulation::new(config);
    let idle = JogInput::default();
    sim.apply(start);

    for tick in 0..args.ticks {
        let report = sim.tick(args.dt, &idle);
        match report.picking {
            PickTransition::None => {}
            transition => println!(
                "{:6} {:?} at {}",
                tick,
                transition,
                pose_to_string(&sim.gripper_pose())
            ),
        }
        match report.animation {
            AnimatorEvent::Advanced(step) => {
                println!("{:6} keyframe {} {}", tick, step, joints_to_string(sim.animator().target()))
            }
            AnimatorEvent::CycleFlipped(direction) => println!("{:6} cycle flipped, now {:?}", tick, direction),
            AnimatorEvent::Completed => {
                println!("{:6} {}", tick, sim.status());
                break;
            }
            _ => {}
        }
        if let StepOutcome::Landed { target, already_flat, .. } = report.physics {
            if !already_flat {
                println!("{:6} cube landed tilted, tipping to face {}", tick, target);
            }
        }
    }

    // Let the cube come to rest after the last release.
    for _ in 0..args.ticks {
        if sim.pick_state() == PickState::Held || sim.free_body().is_at_rest() {
            break;
        }
        sim.tick(args.dt, &idle);
    }

    println!("Status: {}", sim.status());
    println!("Joints: {}", joints_to_string(sim.joints()));
    println!("Gripper: {}", sim.gripper_label());
    println!("Object: {:?}, {}", sim.pick_state(), pose_to_string(&sim.object_pose()));
    Ok(())
}

fn run_drops(config: &SimulationConfig, args: &Args) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let start = Point3::new(0.0, 3.0, 0.0);

    for drop in 0..args.drops {
        let mut body = FreeBody::new(start, random_rotation(&mut rng));
        let mut settled = None;
        for tick in 0..args.ticks {
            if let StepOutcome::Settled { up } = body.step(false, args.dt, &config.physics) {
                settled = Some((tick, up));
                break;
            }
        }
        match settled {
            Some((tick, up)) => println!(
                "Drop {:3}: rests on local {} up after {} ticks, center ({:.3}, {:.3}, {:.3})",
                drop,
                up,
                tick,
                body.position.x,
                body.position.y,
                body.position.z
            ),
            None => anyhow::bail!("Drop {} did not settle within {} ticks", drop, args.ticks),
        }
    }
    Ok(())
}
