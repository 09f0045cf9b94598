use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use poolmap::progress::create_progress_bar;
use poolmap::{paired_sum_cube, squared_random, PoolConfig};

const DEFAULT_PAIR_COUNT: i64 = 100;
const DEFAULT_SEED_COUNT: u64 = 10_000_000;

#[derive(Parser, Debug)]
#[command(name = "poolmap")]
#[command(about = "Map functions over inputs on a worker pool", long_about = None)]
struct Args {
    /// Number of worker threads (defaults to number of CPU cores)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    /// Inputs per chunk in bulk maps (defaults to a size derived from input length)
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Disable progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cube the sum of each pair (0,0)..(N-1,N-1), one task at a time
    Cube {
        /// Number of pairs
        #[arg(short = 'n', long, default_value_t = DEFAULT_PAIR_COUNT)]
        count: i64,
    },
    /// Time squaring a seeded random draw for each seed 0..N
    Squares {
        /// Number of seeds
        #[arg(short = 'n', long, default_value_t = DEFAULT_SEED_COUNT)]
        count: u64,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_names(verbose >= 3)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = PoolConfig::new(args.threads, args.chunk_size);
    debug!(num_workers = config.num_workers(), "parsed configuration");

    match args.command.unwrap_or(Command::Cube {
        count: DEFAULT_PAIR_COUNT,
    }) {
        Command::Cube { count } => {
            let pairs: Vec<(i64, i64)> = (0..count).zip(0..count).collect();
            let cubes = paired_sum_cube(&pairs, config).context("Cube run failed")?;
            println!("{:?}", cubes);
        }
        Command::Squares { count } => {
            let seeds: Vec<u64> = (0..count).collect();

            let progress = if !args.quiet {
                Some(create_progress_bar(seeds.len())?)
            } else {
                None
            };

            let run = squared_random(&seeds, config, progress.as_ref())
                .context("Squares run failed")?;

            if let Some(ref pb) = progress {
                pb.finish_and_clear();
            }

            println!("{}", run.elapsed.as_secs_f64());
        }
    }

    Ok(())
}
