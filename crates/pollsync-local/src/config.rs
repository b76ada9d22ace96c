use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Configuration for the pollsync-local binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "pollsync-local")]
#[command(about = "Mirror a directory listing into an in-memory cache by periodic polling")]
pub struct Config {
    /// Directory to poll
    #[arg(long, env = "POLLSYNC_DIR")]
    pub dir: PathBuf,

    /// Polling period (seconds)
    #[arg(
        long,
        default_value = "30",
        env = "POLLSYNC_PERIOD",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub period_secs: u64,

    /// Only list files with this extension
    #[arg(long, env = "POLLSYNC_EXTENSION")]
    pub extension: Option<String>,

    /// Include hidden entries (names starting with '.')
    #[arg(long)]
    pub include_hidden: bool,

    /// Hash file contents to detect edits that keep size and mtime
    #[arg(long)]
    pub hash_contents: bool,

    /// Run a single cycle, print the store as JSON and exit
    #[arg(long)]
    pub once: bool,
}

impl Config {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}
