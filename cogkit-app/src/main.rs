mod app;
mod config;
mod session;

use anyhow::Result;
use app::App;
use clap::Parser;
use cogkit_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use session::{ActiveTask, TaskKind};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "cogkit", about = "Interactive cognitive assessments")]
struct Args {
    /// Assessment to run: maze | nback | clock | trail
    #[arg(long, value_enum, default_value_t = TaskKind::Maze)]
    task: TaskKind,

    /// JSON options for the task (camelCase keys, e.g. {"mazeSize": 21}).
    /// Keys left out keep their defaults.
    #[arg(long, value_name = "path")]
    config: Option<PathBuf>,

    /// RNG seed for reproducible content. If omitted, seeded from the OS.
    #[arg(long)]
    seed: Option<u64>,

    /// Append each completed session's outcome to this file as one JSON line.
    #[arg(long, value_name = "path")]
    results: Option<PathBuf>,

    /// Cap the frame rate; without it frames follow vsync.
    #[arg(long)]
    fps: Option<u32>,

    /// Print the effective task config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", args.task.config_json(args.config.as_deref())?);
        return Ok(());
    }

    init_logging();

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    info!(task = args.task.name(), seed = args.seed, "loading task");

    let timer = HighPrecisionTimer::new();
    let task = ActiveTask::build(
        args.task,
        args.config.as_deref(),
        args.results,
        timer.clone(),
        rng,
    )?;
    App::new(task, timer, args.fps).run()
}
