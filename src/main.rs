use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use mindmorph::{RunOptions, ShapeParams};
use std::io;
use std::path::PathBuf;

/// Point-cloud hero visualization: scatter -> cube -> brain
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Number of particles
  #[arg(short, long, default_value_t = 30_000)]
  particles: u32,
  /// RNG seed for target generation
  #[arg(short, long, default_value_t = 42)]
  seed: u64,
  /// Sample the brain state from an OBJ surface instead of the analytic shape
  #[arg(short, long)]
  mesh: Option<PathBuf>,
  /// Run the morph loop without a window
  #[arg(long, default_value_t = false)]
  headless: bool,
  /// Frames to simulate in headless mode
  #[arg(long, default_value_t = 600)]
  frames: u32,
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Generate shell completion scripts
  Completions {
    /// The shell to generate the script for
    #[arg(value_enum)]
    shell: Shell,
  },
}

fn main() {
  let args = Args::parse();

  if let Some(Commands::Completions { shell }) = args.command {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    return;
  }

  let opts = RunOptions {
    shape: ShapeParams {
      num_particles: args.particles,
      ..ShapeParams::default()
    },
    seed: args.seed,
    mesh: args.mesh,
    headless: args.headless,
    frames: args.frames,
  };
  mindmorph::state::run(opts);
}
