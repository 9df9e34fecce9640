use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use self::{intro::IntroArg, play::PlayArg, stats::StatsArg};

mod intro;
mod play;
mod stats;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log every move and capture
    #[arg(short, long, global = true)]
    verbose: bool,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the intro and simulation rounds, printing the event stream
    Play(#[clap(flatten)] PlayArg),
    /// Print one generation of intro lines
    Intro(#[clap(flatten)] IntroArg),
    /// Play many sessions and print aggregate statistics
    Stats(#[clap(flatten)] StatsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);

    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Intro(arg) => intro::run(&arg)?,
        Mode::Stats(arg) => stats::run(&arg)?,
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
