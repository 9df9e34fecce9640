use std::{fmt, fmt::Write as _, str::FromStr};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform, uniform::SampleUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{InvalidRangeError, ParseSeedError};

/// Seed for a reproducible stream of simulation randomness.
///
/// A 128-bit value, serialized as a 32-character hex string. Simulations are
/// unseeded by default; a seed is only needed to replay or test a run.
///
/// # Example
///
/// ```
/// use rerematch_engine::SimulationSeed;
/// use rand::Rng as _;
///
/// let seed: SimulationSeed = rand::rng().random();
/// let parsed: SimulationSeed = seed.to_string().parse().unwrap();
/// assert_eq!(seed, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimulationSeed([u8; 16]);

impl SimulationSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for SimulationSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = u128::from_be_bytes(self.0);
        write!(f, "{num:032x}")
    }
}

impl FromStr for SimulationSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError::InvalidLength(s.len()));
        }
        let num =
            u128::from_str_radix(s, 16).map_err(|_| ParseSeedError::InvalidHex(s.to_owned()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for SimulationSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for SimulationSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `SimulationSeed` values with `rng.random()`.
impl Distribution<SimulationSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SimulationSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SimulationSeed(seed)
    }
}

/// An inclusive `[min, max]` range sampled uniformly.
///
/// Deserialized ranges are not checked; call [`Self::validate`] (or
/// [`SimulationConfig::validate`](super::SimulationConfig::validate)) after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusiveRange<T> {
    min: T,
    max: T,
}

impl<T> InclusiveRange<T>
where
    T: Copy + PartialOrd + fmt::Display,
{
    pub fn new(name: &'static str, min: T, max: T) -> Result<Self, InvalidRangeError> {
        let range = Self { min, max };
        range.validate(name)?;
        Ok(range)
    }

    pub fn validate(&self, name: &'static str) -> Result<(), InvalidRangeError> {
        if self.min > self.max {
            return Err(InvalidRangeError::new(name, self.min, self.max));
        }
        Ok(())
    }

    #[must_use]
    pub const fn min(&self) -> T {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> T {
        self.max
    }

    pub fn sample<R>(&self, rng: &mut R) -> T
    where
        R: Rng + ?Sized,
        T: SampleUniform,
    {
        rng.random_range(self.min..=self.max)
    }
}

/// Parameters of one game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of moves before the round is closed.
    pub step_ceiling: usize,
    /// Duration of a single move.
    pub speed: InclusiveRange<u64>,
    /// Pause inserted after every move.
    pub inter_step_gap: u64,
    pub reveal: RevealTiming,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            step_ceiling: 130,
            speed: InclusiveRange { min: 160, max: 250 },
            inter_step_gap: 0,
            reveal: RevealTiming::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), InvalidRangeError> {
        self.speed.validate("speed")
    }
}

/// Fade timings around a session: old trails out, pieces in, pieces out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    /// Trails left on the board start fading within this window after the base delay.
    pub fade_previous_max_delay: u64,
    pub fade_previous_duration: u64,
    /// Pause between the board being cleared and the pieces appearing.
    pub show_lead: u64,
    pub show_duration: u64,
    pub erase_duration: u64,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            fade_previous_max_delay: 1000,
            fade_previous_duration: 500,
            show_lead: 100,
            show_duration: 400,
            erase_duration: 200,
        }
    }
}

/// Parameters of the intro path generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Number of lines attempted per generation.
    pub line_count: InclusiveRange<usize>,
    /// Vertices added after a line's starting point.
    pub extra_vertices: InclusiveRange<usize>,
    /// Length of the intro; line timings are fractions of it.
    pub intro_interval: u64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            line_count: InclusiveRange { min: 8, max: 36 },
            extra_vertices: InclusiveRange { min: 1, max: 5 },
            intro_interval: 10_000,
        }
    }
}

impl PathConfig {
    pub fn validate(&self) -> Result<(), InvalidRangeError> {
        self.line_count.validate("line count")?;
        self.extra_vertices.validate("extra vertices")
    }

    /// Delay after which the first simulation round may start.
    #[must_use]
    pub const fn simulation_start(&self) -> u64 {
        self.intro_interval * 4 / 10
    }

    #[must_use]
    pub fn line_timings(&self) -> LineTimings {
        let percent = |p: u64| self.intro_interval * p / 100;
        LineTimings {
            lines_in: LineTiming {
                delay: InclusiveRange {
                    min: percent(5),
                    max: percent(10),
                },
                duration: InclusiveRange {
                    min: percent(20),
                    max: percent(25),
                },
            },
            lines_out: LineTiming {
                delay: InclusiveRange {
                    min: percent(40),
                    max: percent(75),
                },
                duration: InclusiveRange {
                    min: percent(10),
                    max: percent(25),
                },
            },
        }
    }
}

/// Delay and duration ranges for drawing or erasing intro lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTiming {
    pub delay: InclusiveRange<u64>,
    pub duration: InclusiveRange<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTimings {
    pub lines_in: LineTiming,
    pub lines_out: LineTiming,
}

/// Parameters of the multi-board simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub boards: usize,
    pub session: SessionConfig,
    pub path: PathConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            boards: 6,
            session: SessionConfig::default(),
            path: PathConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), InvalidRangeError> {
        self.session.validate()?;
        self.path.validate()
    }
}
