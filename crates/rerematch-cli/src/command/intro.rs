use std::path::PathBuf;

use rand::Rng as _;
use rerematch_engine::{PathGenerator, SimulationSeed};
use tracing::info;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct IntroArg {
    /// Seed as 32 hex digits, for a reproducible generation
    #[arg(long)]
    seed: Option<SimulationSeed>,
    /// Simulation config file (JSON format); only the path settings are used
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &IntroArg) -> anyhow::Result<()> {
    let IntroArg {
        seed,
        config,
        output,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!(%seed, "generating intro lines");

    let lines = PathGenerator::with_seed(config.path, seed).generate(());
    Output::create(output.as_deref())?.write_document(&lines)?;

    Ok(())
}
