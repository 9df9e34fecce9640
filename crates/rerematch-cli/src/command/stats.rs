use std::path::PathBuf;

use rand::Rng as _;
use rerematch_engine::{EndReason, GameSession, SessionSummary, SimulationSeed};
use serde::Serialize;
use tracing::info;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatsArg {
    /// Number of sessions to play
    #[arg(long, default_value_t = 1000)]
    sessions: usize,
    /// Seed as 32 hex digits, for reproducible statistics
    #[arg(long)]
    seed: Option<SimulationSeed>,
    /// Simulation config file (JSON format); only the session settings are used
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
struct EndReasonCounts {
    king_captured: usize,
    no_movable_piece: usize,
    step_ceiling: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
struct StatsReport {
    seed: Option<SimulationSeed>,
    sessions: usize,
    end_reasons: EndReasonCounts,
    mean_steps: f64,
    max_steps: usize,
    total_steps: usize,
    mean_captures: f64,
    total_captures: usize,
    total_promotions: usize,
    /// Virtual time covered by all sessions, back to back.
    total_duration: u64,
}

impl StatsReport {
    fn add(&mut self, summary: &SessionSummary) {
        self.sessions += 1;
        match summary.end {
            EndReason::KingCaptured => self.end_reasons.king_captured += 1,
            EndReason::NoMovablePiece => self.end_reasons.no_movable_piece += 1,
            EndReason::StepCeiling => self.end_reasons.step_ceiling += 1,
        }
        self.max_steps = self.max_steps.max(summary.steps);
        self.total_steps += summary.steps;
        self.total_captures += summary.captures;
        self.total_promotions += summary.promotions;
        self.total_duration = summary.final_delay;
    }

    #[expect(clippy::cast_precision_loss)]
    fn finish(mut self) -> Self {
        if self.sessions > 0 {
            let n = self.sessions as f64;
            self.mean_steps = self.total_steps as f64 / n;
            self.mean_captures = self.total_captures as f64 / n;
        }
        self
    }
}

pub(crate) fn run(arg: &StatsArg) -> anyhow::Result<()> {
    let StatsArg {
        sessions,
        seed,
        config,
        output,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!(%seed, sessions, "collecting session statistics");

    let mut session = GameSession::with_seed(config.session, seed);
    let mut report = StatsReport {
        seed: Some(seed),
        ..StatsReport::default()
    };
    let mut delay = 0;
    for _ in 0..*sessions {
        let summary = session.play(delay, ());
        delay = summary.final_delay;
        report.add(&summary);
    }

    Output::create(output.as_deref())?.write_document(&report.finish())?;
    Ok(())
}
