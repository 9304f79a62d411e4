use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use arm_ik::report::{pose_reports, render_text};
use arm_ik::{ArmKinematics, IkJob, IkSolver, JointVector, SelectionPolicy, JOINT_COUNT};

#[derive(Parser, Debug)]
#[command(name = "arm_ik")]
#[command(about = "Closed-form inverse kinematics for the ZJU-I arm", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a pose sequence (the built-in reference poses by default)
    Solve {
        /// JSON job file with robot, policy and poses
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Override the job's selection policy
        #[arg(short, long, value_enum)]
        policy: Option<SelectionPolicy>,

        /// Print a JSON report instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Forward kinematics for six joint angles in degrees
    Fk {
        #[arg(required = true, num_args = 6, allow_negative_numbers = true)]
        joints: Vec<f64>,
    },
    /// Analytic and chain-derived Jacobians for six joint angles in degrees
    Jacobian {
        #[arg(required = true, num_args = 6, allow_negative_numbers = true)]
        joints: Vec<f64>,
    },
}

fn joints_from_degrees(values: &[f64]) -> Result<JointVector, Box<dyn Error + Send + Sync>> {
    let degrees: [f64; JOINT_COUNT] = values
        .try_into()
        .map_err(|_| format!("expected {JOINT_COUNT} joint angles, got {}", values.len()))?;
    Ok(JointVector::from_degrees(degrees))
}

fn run_solve(
    job: Option<PathBuf>,
    policy: Option<SelectionPolicy>,
    json: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let job = match job {
        Some(path) => IkJob::from_path(path)?,
        None => IkJob::reference(),
    };
    let policy = policy.unwrap_or(job.policy);

    info!(
        "Solving {} poses for {} with policy {:?}",
        job.poses.len(),
        job.robot.name,
        policy
    );

    let solver = IkSolver::new(job.robot)?;
    let outcomes = solver.solve(&job.poses, policy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pose_reports(&outcomes))?);
    } else {
        print!("{}", render_text(&outcomes));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let kinematics = ArmKinematics::default();

    match cli.command {
        Command::Solve { job, policy, json } => run_solve(job, policy, json)?,
        Command::Fk { joints } => {
            let q = joints_from_degrees(&joints)?;
            let pose = kinematics.forward_pose(&q);
            println!(
                "x={:.4} y={:.4} z={:.4} roll={:.4} pitch={:.4} yaw={:.4}",
                pose.x, pose.y, pose.z, pose.roll, pose.pitch, pose.yaw
            );
            println!("{:.4}", kinematics.forward(&q));
        }
        Command::Jacobian { joints } => {
            let q = joints_from_degrees(&joints)?;
            println!("Analytic Jacobian:{:.6}", kinematics.analytic_jacobian(&q));
            println!("Chain Jacobian:{:.6}", kinematics.geometric_jacobian(&q));

            let check = kinematics.validate_jacobian(&q);
            println!(
                "Max deviation {:.3e} (position rows {:.3e}): {}",
                check.max_deviation,
                check.position_deviation,
                if check.passed { "match" } else { "MISMATCH" }
            );
        }
    }
    Ok(())
}
