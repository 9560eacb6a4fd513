//! Single-node ledger bootstrap.
//!
//! # Usage
//! ```text
//! ledger-node [data_dir] [OPTIONS]
//! ```
//!
//! Creates an identity if none exists, opens the chain under `data_dir`,
//! registers the identity as the only validator, appends blocks, then checks
//! chain integrity and has the validator judge the tip. Any failure exits
//! with status 1.

use ledger::config::{ConfigError, NodeConfig};
use ledger::utils::log::{Level, Logger};
use ledger::{error, info, node};
use std::env;
use std::process;

fn main() {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "ledger-node".to_string());

    let config = match NodeConfig::from_args(args, |key| env::var(key).ok()) {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            print_usage(&program);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}\n", e);
            print_usage(&program);
            process::exit(1);
        }
    };

    let mut logger = Logger::new("node");
    if config.quiet {
        logger = logger.with_min_level(Level::Warn);
    }

    match node::run(&config, &logger) {
        Ok(report) => {
            info!(
                logger,
                "done: {} blocks appended, height {}, tip {}",
                report.inserted,
                report.height,
                report.tip
            );
        }
        Err(e) => {
            error!(logger, "{}", e);
            process::exit(1);
        }
    }
}

const USAGE: &str = "\
Ledger Node

USAGE:
    {program} [data_dir] [OPTIONS]

ARGS:
    [data_dir]          Directory holding the chain database and default identity
                        (default: ./ledger-data)

OPTIONS:
    --wallet <path>     Identity file (default: <data_dir>/wallet.key)
    --blocks <n>        Blocks to append this run (default: 3)
    --quiet             Only log warnings and errors
    --reset             Delete the chain database before starting
    -h, --help          Print this help message

ENVIRONMENT:
    LEDGER_DATA_DIR     Data directory when no argument is given
    LEDGER_WALLET_PATH  Identity file when --wallet is not given

EXAMPLES:
    # Fresh chain in ./ledger-data
    {program}

    # Extend an existing chain by ten blocks
    {program} /var/lib/ledger --blocks 10
";

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
