use std::path::PathBuf;

use clap::Parser;
use liquid_host::init::{self, HostOptions};
use liquid_host::load::load_liquid_config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "liquid.ron")]
    config: PathBuf,

    #[arg(short, long, default_value_t = 600)]
    frames: u32,

    /// Average raindrops per frame
    #[arg(short, long, default_value_t = 0.5)]
    drops: f32,

    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory for PNG dumps of the final height and normal maps
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Log height statistics every this many frames (0 disables)
    #[arg(long, default_value_t = 60)]
    stats_interval: u64,
}

fn main() {
    let args = Args::parse();

    if args.frames == 0 {
        eprintln!("Error: frames must be at least 1.");
        std::process::exit(1);
    }
    if !(args.drops.is_finite() && args.drops >= 0.0) {
        eprintln!("Error: drops must be a finite value of at least 0.");
        eprintln!("Got: {}", args.drops);
        std::process::exit(1);
    }

    let config = match load_liquid_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Could not load liquid config {}: {err}", args.config.display());
            std::process::exit(1);
        }
    };

    init::init(
        config,
        HostOptions {
            frames: args.frames,
            drops_per_frame: args.drops,
            seed: args.seed.unwrap_or_else(rand::random::<u64>),
            dump: args.dump,
            stats_interval: args.stats_interval,
        },
    );
}
