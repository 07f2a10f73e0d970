use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use core::{num::NonZeroUsize, time::Duration};
use std::path::PathBuf;
use trickle::SourceConfig;

/// Which source the driver runs.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Replay `--items` once and exit.
    Items,
    /// Rate-limited `SimpleEvent` stream, one independent stream per worker.
    Stream,
    /// Replicated `i64` stream split across simulated members.
    Long,
}

/// Runtime configuration for the `trickle` binary.
///
/// All values are parsed from CLI arguments or environment variables. A
/// `--config` document, when given, replaces every source-related flag.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "trickle",
    version,
    about = "Emit paced synthetic events as JSON lines"
)]
pub struct CliArgs {
    /// Source to run.
    ///
    /// Environment variable: `TRICKLE_SOURCE`
    #[arg(long, env = "TRICKLE_SOURCE", value_enum, default_value_t = SourceKind::Stream)]
    pub source: SourceKind,

    /// Target rate. For `stream` this applies to every worker; for `long` it
    /// is the aggregate across all instances.
    ///
    /// Environment variable: `ITEMS_PER_SECOND`
    #[arg(long, env = "ITEMS_PER_SECOND", default_value_t = 10)]
    pub items_per_second: i64,

    /// Comma separated items for the `items` source. Each one is parsed as
    /// JSON when possible and kept as a string otherwise.
    ///
    /// The list is split on every comma before parsing, so JSON objects or
    /// arrays with more than one element cannot be passed here. Use `--config`
    /// for structured items.
    ///
    /// Environment variable: `ITEMS`
    #[arg(long, env = "ITEMS", value_delimiter = ',')]
    pub items: Option<Vec<String>>,

    /// Delay before the `long` source emits its first value.
    ///
    /// Environment variable: `INITIAL_DELAY_MS`
    #[arg(long, env = "INITIAL_DELAY_MS", default_value_t = 0)]
    pub initial_delay_ms: u64,

    /// Instances hosted per member by the `long` source. Defaults to the
    /// worker count.
    ///
    /// Environment variable: `LOCAL_PARALLELISM`
    #[arg(long, env = "LOCAL_PARALLELISM")]
    pub local_parallelism: Option<NonZeroUsize>,

    /// Number of simulated cluster members for the `long` source.
    ///
    /// Environment variable: `MEMBERS`
    #[arg(long, env = "MEMBERS", default_value_t = 1)]
    pub members: usize,

    /// Number of worker tasks. Defaults to the number of CPUs.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS")]
    pub workers: Option<usize>,

    /// Stop after this many seconds. Runs until interrupted when unset.
    ///
    /// Environment variable: `RUN_DURATION_SECS`
    #[arg(long, env = "RUN_DURATION_SECS")]
    pub duration_secs: Option<u64>,

    /// Longest a worker sleeps between polls, even when its source reports a
    /// longer wait.
    ///
    /// Environment variable: `POLL_INTERVAL_MS`
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 10)]
    pub poll_interval_ms: u64,

    /// Batches buffered between the workers and the output writer.
    ///
    /// Environment variable: `CHANNEL_CAPACITY`
    #[arg(long, env = "CHANNEL_CAPACITY", default_value_t = 64)]
    pub channel_capacity: usize,

    /// JSON source configuration file, overriding the source flags.
    ///
    /// Environment variable: `SOURCE_CONFIG`
    #[arg(long, env = "SOURCE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source: SourceConfig,
    pub workers: NonZeroUsize,
    pub members: NonZeroUsize,
    pub duration: Option<Duration>,
    pub poll_interval: Duration,
    pub channel_capacity: usize,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let workers = args.workers.unwrap_or_else(num_cpus::get);
        let Some(workers) = NonZeroUsize::new(workers) else {
            bail!("NUM_WORKERS must be greater than 0");
        };

        let Some(members) = NonZeroUsize::new(args.members) else {
            bail!("MEMBERS must be greater than 0");
        };

        if args.poll_interval_ms == 0 {
            bail!("POLL_INTERVAL_MS must be greater than 0");
        }

        if args.channel_capacity == 0 {
            bail!("CHANNEL_CAPACITY must be greater than 0");
        }

        let source = match &args.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                SourceConfig::from_json(&raw)
                    .with_context(|| format!("failed to parse {}", path.display()))?
            }
            None => source_from_flags(&args),
        };

        Ok(Self {
            source,
            workers,
            members,
            duration: args.duration_secs.map(Duration::from_secs),
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            channel_capacity: args.channel_capacity,
        })
    }
}

fn source_from_flags(args: &CliArgs) -> SourceConfig {
    match args.source {
        SourceKind::Items => SourceConfig::Items {
            items: args
                .items
                .as_ref()
                .map(|raw| raw.iter().map(|s| parse_item(s)).collect()),
        },
        SourceKind::Stream => SourceConfig::ItemStream {
            items_per_second: Some(args.items_per_second),
        },
        SourceKind::Long => SourceConfig::LongStream {
            items_per_second: Some(args.items_per_second),
            initial_delay_ms: args.initial_delay_ms,
            preferred_local_parallelism: args.local_parallelism,
        },
    }
}

fn parse_item(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()))
}
