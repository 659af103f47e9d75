use crate::demo::workload::WorkloadConfig;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Indexed collection walkthrough and concurrent workload
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Size of the thread pool running the workload
    #[arg(short, long, default_value = "4")]
    pub threads: usize,

    /// Number of jobs adding, updating and removing entries
    #[arg(short, long, default_value = "2")]
    pub writers: usize,

    /// Number of jobs querying the collection
    #[arg(short, long, default_value = "6")]
    pub readers: usize,

    /// Operations performed by each job
    #[arg(long, alias = "ops", default_value = "10000")]
    pub ops_per_thread: usize,

    /// Ids and names are drawn from `0..key_space`
    #[arg(long, default_value = "64")]
    pub key_space: u32,

    /// Seed of the workload, random if not set
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Render the collected metrics once the workload is over
    #[arg(long, default_value = "false")]
    pub print_metrics: bool,

    /// Print the report as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Only run the concurrent workload
    #[arg(long, default_value = "false")]
    pub skip_walkthrough: bool,
}

pub fn read_args() -> Args {
    Args::parse()
}

impl Args {
    pub fn workload_config(&self) -> WorkloadConfig {
        WorkloadConfig {
            threads: self.threads.max(1),
            writers: self.writers,
            readers: self.readers,
            ops_per_thread: self.ops_per_thread,
            key_space: self.key_space.max(1),
            seed: self.seed.unwrap_or_else(rand::random),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["multikey", "--seed", "7"]);
        let config = args.workload_config();

        assert_eq!(config.threads, 4);
        assert_eq!(config.writers, 2);
        assert_eq!(config.readers, 6);
        assert_eq!(config.key_space, 64);
        assert_eq!(config.seed, 7);
        assert!(!args.json);
    }

    #[test]
    fn clamps_empty_pool() {
        let args = Args::parse_from(["multikey", "--threads", "0", "--key-space", "0"]);
        let config = args.workload_config();

        assert_eq!(config.threads, 1);
        assert_eq!(config.key_space, 1);
    }
}
