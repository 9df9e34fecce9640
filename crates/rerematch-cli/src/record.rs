use std::{
    collections::VecDeque,
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use rerematch_engine::{Event, SimulationConfig, SimulationSeed};
use serde::Serialize;

/// Keeps the tail of a simulation's event stream.
///
/// At most `history_size` events are held; older ones are dropped and only
/// counted, so long runs stay within bounded memory. Feed it through
/// [`EventFn`](rerematch_engine::EventFn) and call
/// [`into_recording`](Self::into_recording) once the run is over.
#[derive(Debug)]
pub struct Recorder {
    seed: SimulationSeed,
    config: SimulationConfig,
    history_size: usize,
    dropped: usize,
    events: VecDeque<Event>,
}

impl Recorder {
    pub fn new(seed: SimulationSeed, config: SimulationConfig, history_size: usize) -> Self {
        Self {
            seed,
            config,
            history_size,
            dropped: 0,
            events: VecDeque::new(),
        }
    }

    pub fn record(&mut self, event: Event) {
        if self.events.len() == self.history_size {
            self.dropped += 1;
            if self.events.pop_front().is_none() {
                return;
            }
        }
        self.events.push_back(event);
    }

    /// Finishes the run, stamping the recording with the current time.
    pub fn into_recording(self, rounds: usize, final_delay: u64) -> Recording {
        Recording {
            recorded_at: Utc::now(),
            seed: self.seed,
            config: self.config,
            rounds,
            final_delay,
            dropped_events: self.dropped,
            events: self.events,
        }
    }
}

/// A finished simulation run.
///
/// The seed and config are enough to replay the whole run; `events` holds
/// the tail that fit in the history.
#[derive(Debug, Clone, Serialize)]
pub struct Recording {
    recorded_at: DateTime<Utc>,
    seed: SimulationSeed,
    config: SimulationConfig,
    rounds: usize,
    final_delay: u64,
    dropped_events: usize,
    events: VecDeque<Event>,
}

impl Recording {
    /// Saves the recording as `simulation_{YYYYMMDD_HHMMSS}.json` in
    /// `record_dir` (created if missing) and returns the file's path.
    pub fn save(&self, record_dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(record_dir)
            .with_context(|| format!("Failed to create directory {}", record_dir.display()))?;

        let filename = format!(
            "simulation_{}.json",
            self.recorded_at.format("%Y%m%d_%H%M%S")
        );
        let filepath = record_dir.join(filename);

        let file = File::create(&filepath)
            .with_context(|| format!("Failed to create file: {}", filepath.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write JSON to {}", filepath.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {}", filepath.display()))?;

        Ok(filepath)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use rerematch_engine::{EventFn, Simulation};

    use super::*;

    fn seed() -> SimulationSeed {
        SimulationSeed::from_bytes([3; 16])
    }

    fn board(index: usize) -> Event {
        Event::Board { index }
    }

    #[test]
    fn test_recorder_keeps_latest_events() {
        let mut recorder = Recorder::new(seed(), SimulationConfig::default(), 3);
        for index in 1..=10 {
            recorder.record(board(index));
        }
        let recording = recorder.into_recording(0, 0);
        assert_eq!(recording.dropped_events, 7);
        assert_eq!(recording.events, [board(8), board(9), board(10)]);
    }

    #[test]
    fn test_recorder_with_no_history_only_counts() {
        let mut recorder = Recorder::new(seed(), SimulationConfig::default(), 0);
        recorder.record(board(0));
        recorder.record(board(1));
        let recording = recorder.into_recording(0, 0);
        assert_eq!(recording.dropped_events, 2);
        assert!(recording.events.is_empty());
    }

    #[test]
    fn test_recording_ends_with_the_last_game() {
        let config = SimulationConfig {
            boards: 2,
            ..SimulationConfig::default()
        };
        let mut recorder = Recorder::new(seed(), config, 5);
        let final_delay = Simulation::with_seed(config, seed())
            .run(1, EventFn(|event| recorder.record(event)));
        let recording = recorder.into_recording(1, final_delay);

        assert_eq!(recording.events.len(), 5);
        assert!(recording.dropped_events > 0);
        assert!(matches!(
            recording.events.back(),
            Some(Event::GameEnd { final_delay: d, .. }) if *d == final_delay
        ));
    }

    #[test]
    fn test_save_names_file_after_recording_time() {
        let dir = env::temp_dir().join(format!("rerematch_record_{}", process::id()));
        let recording = Recorder::new(seed(), SimulationConfig::default(), 10).into_recording(0, 0);
        let path = recording.save(&dir).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        fs::remove_dir_all(&dir).unwrap();
        let expected = format!("simulation_{}.json", recording.recorded_at.format("%Y%m%d_%H%M%S"));
        assert_eq!(path.file_name().unwrap().to_str(), Some(expected.as_str()));
        assert_eq!(json["seed"], "03030303030303030303030303030303");
        assert_eq!(json["config"]["boards"], 6);
    }
}
