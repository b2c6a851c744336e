use anyhow::Context;
use clap::{Parser, ValueEnum};
use generator::profile::{build_session, FormFault};
use rockcore::ExerciseType;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod workflow;

#[derive(Clone, Copy, ValueEnum)]
enum ExerciseArg {
    Quadruped,
    ToeDrive,
}

impl From<ExerciseArg> for ExerciseType {
    fn from(arg: ExerciseArg) -> Self {
        match arg {
            ExerciseArg::Quadruped => ExerciseType::Quadruped,
            ExerciseArg::ToeDrive => ExerciseType::ToeDrive,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Offline quadruped rocking session driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ExerciseArg::Quadruped)]
    exercise: ExerciseArg,
    #[arg(long, default_value_t = 180)]
    frames: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Inject a form fault into the recorded frames
    #[arg(long, value_enum)]
    fault: Option<FormFault>,
    /// Start recording without confirming the starting posture
    #[arg(long, default_value_t = false)]
    skip_posture: bool,
    /// Replay the recorded timeline at this frame rate
    #[arg(long)]
    replay_fps: Option<f32>,
    /// Append the session result as a JSON line to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn print_result(result: &WorkflowResult) {
    if let Some(verdict) = &result.verdict {
        println!("Starting posture -> {}", verdict.message);
    }
    println!(
        "Session -> frames {}, average score {:.1}",
        result.feedback.frame_count, result.feedback.average_score
    );
    for strength in &result.report.strengths {
        println!("  + {}", strength);
    }
    for suggestion in &result.report.suggestions {
        println!("  - {}", suggestion);
    }
    if let Some(celebration) = &result.report.celebration {
        println!("  {}", celebration);
    }
    if let Some(cadence) = result.cadence_hz {
        println!("  rocking cadence {:.2} Hz", cadence);
    }
    if let Some(stats) = &result.report.stats {
        println!(
            "  accuracy {}%, form breaks {}, rating {:?}",
            stats.accuracy_percent, stats.form_breaks, stats.rating
        );
    }
    if let Some(replay) = &result.replay {
        println!(
            "Replay -> {}/{} ticks resolved, {} frames interpolated",
            replay.resolved, replay.ticks, replay.filled
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.exercise.into(), args.frames, args.seed, args.fault)
    };
    workflow_config.skip_posture |= args.skip_posture;
    if args.replay_fps.is_some() {
        workflow_config.replay_fps = args.replay_fps;
    }

    let session_data =
        build_session(&workflow_config.generator).context("generating synthetic session")?;
    let result = Runner::new(workflow_config).execute(&session_data)?;
    print_result(&result);

    if let Some(report_path) = args.report {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let mut line = serde_json::to_string(&result).context("serializing session report")?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("writing report {}", report_path.display()))?;
    }

    Ok(())
}
