use std::path::PathBuf;

use clap::Parser;

/// Train neural-net Melee agents against a live Dolphin process.
///
/// One long-running command: it writes the watched-address list, waits for
/// the emulator, and evolves the population until the configured generation
/// count is reached or Ctrl-C stops it at a generation boundary.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct CommandArgs {
    /// Number of generations to train
    #[arg(long, default_value_t = 500)]
    pub(crate) generations: u32,
    /// Steady-state population size (and agents per episode)
    #[arg(long, default_value_t = 30)]
    pub(crate) population: usize,
    /// Probability of crossing over a parent pair
    #[arg(long, default_value_t = 0.9)]
    pub(crate) cxpb: f32,
    /// Spread exponent for crossover and mutation
    #[arg(long, default_value_t = 20.0)]
    pub(crate) eta: f32,
    /// Frames each agent holds the controller per episode
    #[arg(long, default_value_t = 120)]
    pub(crate) frames_per_agent: u32,
    /// Abort if the game stays outside active play this long
    #[arg(long, default_value_t = 90)]
    pub(crate) menu_timeout_secs: u64,
    /// Abort if the event stream goes silent this long
    #[arg(long, default_value_t = 10)]
    pub(crate) stall_timeout_secs: u64,
    /// RNG seed for a reproducible run
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Dolphin user directory (autodetected when omitted)
    #[arg(long)]
    pub(crate) dolphin_dir: Option<PathBuf>,
    /// Champion model output path (stdout when omitted)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    crate::train::run(&args)
}
