use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use rerematch_engine::{Event, SimulationConfig};
use serde::Serialize;

/// Destination of a command's JSON: stdout, or the file given with `--output`.
#[derive(Debug)]
pub enum Output {
    Stdout(io::Stdout),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Output::Stdout(io::stdout()));
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    /// Writes `value` as one pretty-printed JSON document.
    pub fn write_document<T>(mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut self, value)
            .with_context(|| format!("Failed to write JSON to {self}"))?;
        writeln!(self).with_context(|| format!("Failed to write to {self}"))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {self}"))
    }

    /// Turns the output into a newline-delimited JSON event stream.
    pub fn into_event_stream(self) -> EventStream {
        EventStream {
            output: self,
            written: 0,
            error: None,
        }
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Stdout(_) => f.write_str("stdout"),
            Output::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(stdout) => stdout.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(stdout) => stdout.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Writes events one JSON object per line as they are produced, so a
/// renderer can consume a run while it is still being computed.
///
/// Writing stops at the first I/O error, which [`Self::finish`] reports.
#[derive(Debug)]
pub struct EventStream {
    output: Output,
    written: usize,
    error: Option<anyhow::Error>,
}

impl EventStream {
    pub fn emit(&mut self, event: &Event) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.output, event)
            .map_err(anyhow::Error::from)
            .and_then(|()| writeln!(self.output).map_err(anyhow::Error::from));
        match result {
            Ok(()) => self.written += 1,
            Err(err) => {
                self.error = Some(err.context(format!("Failed to stream events to {}", self.output)));
            }
        }
    }

    /// Flushes the stream and returns the number of events written.
    pub fn finish(mut self) -> anyhow::Result<usize> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.output
            .flush()
            .with_context(|| format!("Failed to flush output to {}", self.output))?;
        Ok(self.written)
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {} JSON file: {}", file_kind, path.display()))
}

/// Load the simulation configuration, falling back to the defaults
///
/// Missing fields in the file keep their default values.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed, or if a range in it
/// has `min > max`
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let config: SimulationConfig = read_json_file("config", path)?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}
