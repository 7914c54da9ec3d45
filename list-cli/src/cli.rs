use clap::Parser;
use cos_core::{bucket::DEFAULT_MAX_KEYS, ConnectionArgs};

/// List objects in a COS bucket to check that the configuration works
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Only list keys starting with this prefix
    #[arg(long, default_value = "")]
    pub prefix: String,
    /// Maximum number of keys to request
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_KEYS,
        value_parser = clap::value_parser!(i32).range(1..=1000)
    )]
    pub max_keys: i32,
    /// Number of keys to print
    #[arg(long, default_value_t = 10)]
    pub show: usize,
    /// Print the listing as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
