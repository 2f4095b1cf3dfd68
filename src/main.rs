use clap::Parser;
use image_trail::config::TrailConfig;
use image_trail::fade::FadeConfig;
use image_trail::stage::{Stage, StageError, StageOptions, Summary};
use std::path::PathBuf;

/// Process exit code for errors
const PROCESS_EXIT_CODE_ERROR: i32 = 1;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replays host event scripts against an image trail", long_about = None)]
struct Args {
    /// JSON-lines event script to replay
    #[arg(long)]
    script: PathBuf,

    /// JSON trail configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Variant number (1-8) or name, overrides the config file
    #[arg(long)]
    variant: Option<String>,

    /// Activation distance in pixels, overrides the config file
    #[arg(long)]
    threshold: Option<f64>,

    /// Container width
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Container height
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Number of image slots in the container
    #[arg(long, default_value_t = 10)]
    slots: usize,

    #[arg(long, default_value_t = 200.0)]
    slot_width: f64,

    #[arg(long, default_value_t = 250.0)]
    slot_height: f64,

    /// Seed for random variant parameters
    #[arg(long)]
    seed: Option<u64>,

    /// JSON options for the fade-in element revealed by intersection events
    #[arg(long)]
    fade_config: Option<PathBuf>,
}

fn run(args: Args) -> Result<Summary, StageError> {
    let mut config = match &args.config {
        Some(path) => TrailConfig::load(path)?,
        None => TrailConfig::default(),
    };
    if let Some(variant) = args.variant {
        config = config.with_variant(variant);
    }
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }

    let options = StageOptions {
        width: args.width,
        height: args.height,
        slots: args.slots,
        slot_width: args.slot_width,
        slot_height: args.slot_height,
        seed: args.seed,
        fade: match &args.fade_config {
            Some(path) => FadeConfig::load(path)?,
            None => FadeConfig::default(),
        },
    };
    Stage::replay(config, &options, &args.script)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let result = run(args)
        .and_then(|summary| serde_json::to_string_pretty(&summary).map_err(StageError::from));
    match result {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("main: {e}");
            std::process::exit(PROCESS_EXIT_CODE_ERROR);
        }
    }
}
