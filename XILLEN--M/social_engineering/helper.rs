use std::{collections::VecDeque, fmt, ops::RangeInclusive, path::PathBuf, sync::Arc};

use anyhow::Result;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde_json::Value;
use shared_event_bus::{EventPublisher, EventRecord, FileEventPublisher};
use shared_logging::{JsonLogger, LogLevel, LogRecord};

/// Telemetry builder for a simulation run.
pub struct SimulationTelemetryBuilder {
    module: String,
    logger: Option<JsonLogger>,
    log_path: Option<(PathBuf, LogLevel)>,
    event_publisher: Option<Arc<dyn EventPublisher>>,
    event_path: Option<PathBuf>,
}

impl SimulationTelemetryBuilder {
    /// Creates a new builder scoped to a module label.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            logger: None,
            log_path: None,
            event_publisher: None,
            event_path: None,
        }
    }

    /// Uses an already constructed logger.
    #[must_use]
    pub fn logger(mut self, logger: JsonLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Logs to a file at `path`, keeping records at `min_level` and above.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>, min_level: LogLevel) -> Self {
        self.log_path = Some((path.into(), min_level));
        self
    }

    /// Sets the event publisher.
    #[must_use]
    pub fn event_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.event_publisher = Some(publisher);
        self
    }

    /// Appends events as JSON lines to `path` unless a publisher is set.
    #[must_use]
    pub fn event_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.event_path = Some(path.into());
        self
    }

    /// Builds telemetry; fails only when a log or event file cannot be opened.
    pub fn build(self) -> Result<SimulationTelemetry> {
        let logger = match (self.logger, self.log_path) {
            (Some(logger), _) => Some(logger),
            (None, Some((path, level))) => Some(JsonLogger::to_file(path, level)?),
            (None, None) => None,
        };
        let publisher = match (self.event_publisher, self.event_path) {
            (Some(publisher), _) => Some(publisher),
            (None, Some(path)) => {
                Some(Arc::new(FileEventPublisher::new(path)?) as Arc<dyn EventPublisher>)
            }
            (None, None) => None,
        };
        Ok(SimulationTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                logger,
                publisher,
            }),
        })
    }
}

/// Telemetry handle shared across the run stages.
#[derive(Clone)]
pub struct SimulationTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for SimulationTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationTelemetry")
            .field("module", &self.inner.module)
            .finish_non_exhaustive()
    }
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl SimulationTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> SimulationTelemetryBuilder {
        SimulationTelemetryBuilder::new(module)
    }

    /// Writes a structured log record; object metadata becomes record fields.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let mut record = LogRecord::new(&self.inner.module, level, message);
            if let Value::Object(fields) = metadata {
                record = fields
                    .into_iter()
                    .fold(record, |record, (key, value)| record.with_field(key, value));
            }
            logger.log(&record)?;
        }
        Ok(())
    }

    /// Publishes an event.
    pub fn event(&self, event_type: &str, payload: Value) -> Result<()> {
        if let Some(publisher) = &self.inner.publisher {
            publisher.publish(EventRecord::new(
                self.inner.module.clone(),
                event_type,
                payload,
            ))?;
        }
        Ok(())
    }
}

/// Source of every random draw a run makes.
///
/// Stages only ever ask for three shapes of draw, so a scripted source can
/// force exact scenarios without reproducing a generator's internal stream.
pub trait DrawSource {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
    /// Uniform integer from the closed `range`.
    fn int(&mut self, range: RangeInclusive<u32>) -> u32;
    /// Fair coin.
    fn coin(&mut self) -> bool;
}

/// Picks one item uniformly from a fixed, non-empty candidate list.
pub fn choose<'a, T>(draws: &mut dyn DrawSource, items: &'a [T]) -> &'a T {
    &items[draws.pick(items.len())]
}

/// Pseudo-random draws backed by a seeded `SmallRng`.
#[derive(Debug, Clone)]
pub struct RandomDraws {
    seed: u64,
    rng: SmallRng,
}

impl RandomDraws {
    /// Reproducible draws for a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: seeded_rng(seed),
        }
    }

    /// Draws seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(random_seed())
    }

    /// Seed in use.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl DrawSource for RandomDraws {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn int(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }

    fn coin(&mut self) -> bool {
        self.rng.gen()
    }
}

/// Replays fixed draws in order.
///
/// Each draw shape has its own queue. Picks wrap modulo the list length and
/// integers are clamped into the requested range, so any script keeps the
/// generated data inside its invariants. An exhausted queue yields the first
/// candidate, the range start, or `false`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    picks: VecDeque<usize>,
    ints: VecDeque<u32>,
    coins: VecDeque<bool>,
}

impl ScriptedDraws {
    /// Empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues index picks.
    #[must_use]
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Queues integer draws.
    #[must_use]
    pub fn with_ints(mut self, ints: impl IntoIterator<Item = u32>) -> Self {
        self.ints.extend(ints);
        self
    }

    /// Queues coin flips.
    #[must_use]
    pub fn with_coins(mut self, coins: impl IntoIterator<Item = bool>) -> Self {
        self.coins.extend(coins);
        self
    }
}

impl DrawSource for ScriptedDraws {
    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().map_or(0, |idx| idx % len)
    }

    fn int(&mut self, range: RangeInclusive<u32>) -> u32 {
        let (low, high) = (*range.start(), *range.end());
        self.ints
            .pop_front()
            .map_or(low, |value| value.clamp(low, high))
    }

    fn coin(&mut self) -> bool {
        self.coins.pop_front().unwrap_or(false)
    }
}

/// Generates a random seed for a run.
#[must_use]
pub fn random_seed() -> u64 {
    rand::thread_rng().gen()
}

/// Returns a reproducible RNG.
#[must_use]
pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}
