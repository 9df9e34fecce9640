use std::path::PathBuf;

use rand::Rng as _;
use rerematch_engine::{EventFn, Simulation, SimulationSeed};
use tracing::info;

use crate::{
    record::Recorder,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Number of rounds to play after the intro
    #[arg(long, default_value_t = 1)]
    rounds: usize,
    /// Number of boards (overrides the config file)
    #[arg(long)]
    boards: Option<usize>,
    /// Seed as 32 hex digits, for a reproducible run
    #[arg(long)]
    seed: Option<SimulationSeed>,
    /// Simulation config file (JSON format)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write events as newline-delimited JSON while the run is computed,
    /// instead of one recording document at the end
    #[arg(long)]
    stream: bool,
    /// Also save the recording to a timestamped file
    #[arg(long)]
    save_recording: bool,
    /// Directory to save recording files
    #[arg(long, default_value = "./data/recordings/")]
    record_dir: PathBuf,
    /// Maximum number of events to keep in memory (oldest are discarded)
    #[arg(long, default_value_t = 100_000)]
    history_size: usize,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            rounds: 1,
            boards: None,
            seed: None,
            config: None,
            output: None,
            stream: false,
            save_recording: false,
            record_dir: PathBuf::from("./data/recordings/"),
            history_size: 100_000,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        rounds,
        boards,
        seed,
        config,
        output,
        stream,
        save_recording,
        record_dir,
        history_size,
    } = arg;

    let mut config = util::load_config(config.as_deref())?;
    if let Some(boards) = boards {
        config.boards = *boards;
    }
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!(%seed, boards = config.boards, rounds, "starting simulation");

    let output = Output::create(output.as_deref())?;
    let mut recorder = Recorder::new(seed, config, *history_size);
    let mut simulation = Simulation::with_seed(config, seed);

    let recording = if *stream {
        let mut events = output.into_event_stream();
        let final_delay = simulation.run(
            *rounds,
            EventFn(|event| {
                events.emit(&event);
                recorder.record(event);
            }),
        );
        let written = events.finish()?;
        info!(events = written, final_delay, "event stream finished");
        recorder.into_recording(*rounds, final_delay)
    } else {
        let final_delay = simulation.run(*rounds, EventFn(|event| recorder.record(event)));
        let recording = recorder.into_recording(*rounds, final_delay);
        output.write_document(&recording)?;
        recording
    };

    if *save_recording {
        let path = recording.save(record_dir)?;
        info!(path = %path.display(), "recording saved");
    }

    Ok(())
}
