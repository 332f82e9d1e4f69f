//! Limber IK/FK switching CLI.
//!
//! Provides three modes of operation:
//! - `demo`: Build the reference arm rig and run a switch round trip
//! - `classify`: Classify selected bone names as a switchable limb
//! - `info`: Print workspace crate versions and the rig-naming contract

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use limber_armature::{Armature, ArmatureBuilder};
use limber_core::config::SwitchConfig;
use limber_core::types::{ContextMode, IK_FK_PROP, LimbKind, SwitchMode};
use limber_switch::{classify, switch_ik_fk};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// IK/FK limb switching for armature rigs.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the reference arm rig and run a switch round trip.
    Demo {
        /// Optional TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the pole probe length, in world units.
        #[arg(short, long)]
        probe_length: Option<f32>,
    },

    /// Classify selected bone names as a switchable limb.
    Classify {
        /// Selected bone names.
        #[arg(required = true)]
        bones: Vec<String>,
    },

    /// Print crate information and the rig-naming contract.
    Info,
}

// ---------------------------------------------------------------------------
// Demo rig
// ---------------------------------------------------------------------------

/// A root bone plus the left arm of the reference naming contract: IK and
/// FK chains off a shared control bone, a free IK hand target, and a pole.
fn demo_rig() -> Armature {
    let offset = |x: f32, y: f32, z: f32| {
        Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
    };

    ArmatureBuilder::new("demo")
        .bone("root", None, Isometry3::identity(), 0.2)
        .bone("upper_arm_parent.L", Some("root"), offset(0.4, 1.4, 0.0), 0.2)
        .bone(
            "upper_arm_ik.L",
            Some("upper_arm_parent.L"),
            offset(0.0, 0.2, 0.0),
            0.5,
        )
        .bone("forearm_ik.L", Some("upper_arm_ik.L"), offset(0.0, 0.5, 0.0), 0.5)
        .bone("hand_ik.L", Some("root"), offset(0.4, 2.6, 0.0), 0.2)
        .bone(
            "upper_arm_fk.L",
            Some("upper_arm_parent.L"),
            offset(0.0, 0.2, 0.0),
            0.5,
        )
        .bone("forearm_fk.L", Some("upper_arm_fk.L"), offset(0.0, 0.5, 0.0), 0.5)
        .bone("hand_fk.L", Some("forearm_fk.L"), offset(0.0, 0.5, 0.0), 0.2)
        .bone("upper_arm_ik_target.L", Some("root"), offset(0.4, 2.1, 0.8), 0.1)
        .two_bone_ik(
            "upper_arm_ik.L",
            "forearm_ik.L",
            "hand_ik.L",
            Some("upper_arm_ik_target.L"),
        )
        .build()
        .expect("demo rig is a valid armature")
}

fn print_chain(rig: &Armature, title: &str, names: &[&str]) {
    println!("{title}:");
    for name in names {
        let bone = rig.bone_by_name(name).expect("demo rig bone");
        let head = bone.world_matrix().translation.vector;
        let (roll, pitch, yaw) = bone.world_matrix().rotation.euler_angles();
        println!(
            "  {name:<22} head ({:+.3}, {:+.3}, {:+.3})  rot ({:+.2}, {:+.2}, {:+.2})",
            head.x, head.y, head.z, roll, pitch, yaw
        );
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_demo(config_path: Option<&Path>, probe_length: Option<f32>) {
    let mut config = match config_path {
        Some(path) => match SwitchConfig::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },
        None => SwitchConfig::default(),
    };
    if let Some(length) = probe_length {
        config.pole_probe_length = length;
    }
    if let Err(err) = config.validate() {
        eprintln!("{err}");
        std::process::exit(1);
    }
    log::debug!("demo config: {config:?}");

    let mut rig = demo_rig();
    let control = rig.find("upper_arm_parent.L").expect("demo rig bone");
    rig.bone_mut(control).set_custom_property(IK_FK_PROP, 0.0);

    // Pull the IK hand target in and down so the elbow bends.
    let hand_ik = rig.find("hand_ik.L").expect("demo rig bone");
    rig.bone_mut(hand_ik)
        .set_translation(Vector3::new(0.0, -0.25, 0.15));
    rig.bone_mut(hand_ik)
        .set_rotation_quaternion(UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3));
    rig.reevaluate();

    print_chain(&rig, "ik chain (authoritative)", LimbKind::ArmLeft.ik_chain());

    let selection = ["hand_ik.L"];
    for _ in 0..2 {
        match switch_ik_fk(&mut rig, &selection, ContextMode::Pose, &config) {
            Ok(report) => {
                println!("\n{}", report.notification());
                let names = match report.mode {
                    SwitchMode::Fk => LimbKind::ArmLeft.fk_chain(),
                    SwitchMode::Ik => LimbKind::ArmLeft.ik_chain(),
                };
                print_chain(&rig, "now authoritative", names);
            }
            Err(err) => {
                eprintln!("{}", err.notification());
                std::process::exit(1);
            }
        }
    }

    let pole = rig
        .bone_by_name("upper_arm_ik_target.L")
        .expect("demo rig bone");
    let head = pole.world_matrix().translation.vector;
    println!(
        "\npole target solved to ({:+.3}, {:+.3}, {:+.3})",
        head.x, head.y, head.z
    );
}

fn run_classify(bones: &[String]) {
    match classify(bones) {
        Some(kind) => {
            println!("limb: {kind}");
            println!("control bone: {}", kind.control_bone());
            println!("ik chain: {}", kind.ik_chain().join(", "));
            println!("fk chain: {}", kind.fk_chain().join(", "));
            if let Some(pole) = kind.pole_target() {
                println!("pole target: {pole}");
            }
        }
        None => {
            eprintln!("selection matches no known limb");
            std::process::exit(1);
        }
    }
}

fn run_info() {
    println!("limber v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  limber-core      {}", env!("CARGO_PKG_VERSION"));
    println!("  limber-armature  {}", env!("CARGO_PKG_VERSION"));
    println!("  limber-ik        {}", env!("CARGO_PKG_VERSION"));
    println!("  limber-switch    {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("limbs:");
    for kind in LimbKind::ALL {
        println!(
            "  {:<10} control {:<20} {} joints{}",
            kind.label(),
            kind.control_bone(),
            kind.ik_chain().len(),
            if kind.pole_target().is_some() {
                ", pole"
            } else {
                ""
            }
        );
    }
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Demo {
            config,
            probe_length,
        }) => run_demo(config.as_deref(), probe_length),
        Some(Commands::Classify { bones }) => run_classify(&bones),
        Some(Commands::Info) => run_info(),
        None => run_demo(None, None),
    }
}
