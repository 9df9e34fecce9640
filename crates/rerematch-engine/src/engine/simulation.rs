use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;
use tracing::info;

use super::{
    event::EventSink,
    game_session::{GameSession, SessionSummary},
    path_generator::PathGenerator,
    timing::{SimulationConfig, SimulationSeed},
};

/// Several boards taking turns, one session at a time.
///
/// A round plays every board once in the current order; each session starts
/// when the previous one ended. The order is reshuffled after every round.
///
/// # Example
///
/// ```
/// use rerematch_engine::{EventLog, Simulation, SimulationConfig};
///
/// let mut simulation = Simulation::new(SimulationConfig::default());
/// let mut log = EventLog::default();
///
/// let start = simulation.intro(&mut log);
/// let next = simulation.play_round(start, &mut log);
/// assert!(next > start);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    sessions: Vec<GameSession>,
    order: Vec<usize>,
    paths: PathGenerator,
    rng: Pcg32,
    rounds_played: usize,
}

impl Simulation {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`]; every board and the path generator derive their
    /// seeds from `seed`.
    #[must_use]
    pub fn with_seed(config: SimulationConfig, seed: SimulationSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.to_bytes());
        let sessions = (0..config.boards)
            .map(|_| GameSession::with_seed(config.session, rng.random()))
            .collect();
        let paths = PathGenerator::with_seed(config.path, rng.random());
        Self {
            config,
            sessions,
            order: initial_order(config.boards),
            paths,
            rng,
            rounds_played: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Board indices in the order the next round will play them.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    #[must_use]
    pub fn rounds_played(&self) -> usize {
        self.rounds_played
    }

    /// Draws one generation of intro lines on every board.
    ///
    /// Returns the delay at which the first round should start.
    pub fn intro<S>(&mut self, mut sink: S) -> u64
    where
        S: EventSink,
    {
        for (index, session) in self.sessions.iter_mut().enumerate() {
            sink.on_board(index);
            self.paths.generate(&mut sink);
            session.mark_trails_present();
        }
        self.config.path.simulation_start()
    }

    /// Plays one session on every board, chaining their delays.
    ///
    /// Returns the delay at which the next round should start.
    pub fn play_round<S>(&mut self, base_delay: u64, mut sink: S) -> u64
    where
        S: EventSink,
    {
        let mut delay = base_delay;
        for &index in &self.order {
            sink.on_board(index);
            let SessionSummary { final_delay, .. } = self.sessions[index].play(delay, &mut sink);
            delay = final_delay;
        }
        self.order.shuffle(&mut self.rng);
        self.rounds_played += 1;
        info!(
            round = self.rounds_played,
            boards = self.sessions.len(),
            next_delay = delay,
            "round finished"
        );
        delay
    }

    /// Runs the intro followed by `rounds` rounds. Returns the final delay.
    pub fn run<S>(&mut self, rounds: usize, mut sink: S) -> u64
    where
        S: EventSink,
    {
        let mut delay = self.intro(&mut sink);
        for _ in 0..rounds {
            delay = self.play_round(delay, &mut sink);
        }
        delay
    }
}

/// First-round order for boards laid out in two rows: along the top row
/// (even indices), then back along the bottom row (odd indices).
fn initial_order(boards: usize) -> Vec<usize> {
    let evens = (0..boards).step_by(2);
    let odds = (1..boards).step_by(2).rev();
    evens.chain(odds).collect()
}
