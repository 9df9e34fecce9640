use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::debug;

use crate::core::{BOARD_SIZE, Position, QUEEN_MATRIX};

use super::{
    event::EventSink,
    timing::{LineTimings, PathConfig, SimulationSeed},
};

/// Start delay and duration of a visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimedSpan {
    pub delay: u64,
    pub duration: u64,
}

/// A decorative polyline with its draw and erase schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntroLine {
    pub points: Vec<Position>,
    pub draw: TimedSpan,
    pub erase: TimedSpan,
}

/// One generation of intro lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntroLines {
    pub lines: Vec<IntroLine>,
    pub timing: LineTimings,
}

/// Generates sets of disjoint random polylines over the 64 board points.
///
/// Unrelated to any piece state. Each line starts at a random unused point and
/// grows by jumping along queen rays to other unused points; a shrinking pool
/// guarantees that no point is used twice within one generation.
#[derive(Debug, Clone)]
pub struct PathGenerator {
    rng: Pcg32,
    config: PathConfig,
}

impl PathGenerator {
    #[must_use]
    pub fn new(config: PathConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(config: PathConfig, seed: SimulationSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.to_bytes()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Generates the polylines only.
    ///
    /// Every returned line has at least two points, and no point appears
    /// twice across all lines.
    pub fn generate_paths(&mut self) -> Vec<Vec<Position>> {
        let line_count = self.config.line_count.sample(&mut self.rng);
        let mut pool: Vec<Position> = Position::all().collect();
        // Every kept line uses at least two of the 64 points.
        let mut lines = Vec::with_capacity(line_count.min(BOARD_SIZE * BOARD_SIZE / 2));

        for _ in 0..line_count {
            if pool.is_empty() {
                break;
            }
            let extra = self.config.extra_vertices.sample(&mut self.rng);
            let start = pool.swap_remove(self.rng.random_range(0..pool.len()));
            let mut line = vec![start];
            let mut current = start;

            for _ in 0..extra {
                let neighbors: Vec<usize> = QUEEN_MATRIX
                    .iter()
                    .filter_map(|&offset| current.offset(offset))
                    .filter_map(|pos| pool.iter().position(|&p| p == pos))
                    .collect();
                if neighbors.is_empty() {
                    break;
                }
                let chosen = neighbors[self.rng.random_range(0..neighbors.len())];
                current = pool.swap_remove(chosen);
                line.push(current);
            }

            if line.len() > 1 {
                lines.push(line);
            }
        }

        debug!(
            attempted = line_count,
            generated = lines.len(),
            unused_points = pool.len(),
            "intro lines generated"
        );
        lines
    }

    /// Generates lines with draw/erase timings and reports them to `sink`.
    pub fn generate<S>(&mut self, mut sink: S) -> IntroLines
    where
        S: EventSink,
    {
        let timing = self.config.line_timings();
        let lines = self
            .generate_paths()
            .into_iter()
            .map(|points| IntroLine {
                points,
                draw: TimedSpan {
                    delay: timing.lines_in.delay.sample(&mut self.rng),
                    duration: timing.lines_in.duration.sample(&mut self.rng),
                },
                erase: TimedSpan {
                    delay: timing.lines_out.delay.sample(&mut self.rng),
                    duration: timing.lines_out.duration.sample(&mut self.rng),
                },
            })
            .collect();
        let lines = IntroLines { lines, timing };
        sink.on_lines_generated(&lines);
        lines
    }
}
