//! Node settings from command-line arguments and environment overrides.
//!
//! Precedence, highest first: explicit argument, environment variable,
//! compiled default.

use ledger_derive::Error;
use std::path::PathBuf;

/// Data directory used when neither an argument nor `LEDGER_DATA_DIR` names one.
pub const DEFAULT_DATA_DIR: &str = "ledger-data";
/// Chain database directory, relative to the data directory.
pub const DEFAULT_CHAIN_PATH: &str = "chain";
/// Identity file, relative to the data directory.
pub const DEFAULT_WALLET_PATH: &str = "wallet.key";
/// Blocks appended per run when `--blocks` is absent.
pub const DEFAULT_BLOCK_COUNT: u64 = 3;

pub const ENV_DATA_DIR: &str = "LEDGER_DATA_DIR";
pub const ENV_WALLET_PATH: &str = "LEDGER_WALLET_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} requires an argument")]
    MissingValue(String),
    #[error("invalid block count: {0}")]
    InvalidBlockCount(String),
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
    #[error("help requested")]
    HelpRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub data_dir: PathBuf,
    pub wallet_path: PathBuf,
    pub blocks: u64,
    pub quiet: bool,
    /// Delete the chain database before opening it.
    pub reset: bool,
}

impl NodeConfig {
    pub fn chain_path(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_CHAIN_PATH)
    }

    /// Parses `args` (without the program name). `env` resolves environment
    /// variables, so tests can supply their own.
    pub fn from_args<I, E>(args: I, env: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut data_dir: Option<PathBuf> = None;
        let mut wallet_path: Option<PathBuf> = None;
        let mut blocks = DEFAULT_BLOCK_COUNT;
        let mut quiet = false;
        let mut reset = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Err(ConfigError::HelpRequested),
                "--wallet" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    wallet_path = Some(PathBuf::from(value));
                }
                "--blocks" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    blocks = match value.parse::<u64>() {
                        Ok(n) if n > 0 => n,
                        _ => return Err(ConfigError::InvalidBlockCount(value)),
                    };
                }
                "--quiet" => quiet = true,
                "--reset" => reset = true,
                other if other.starts_with('-') || data_dir.is_some() => {
                    return Err(ConfigError::UnexpectedArgument(other.to_string()));
                }
                path => data_dir = Some(PathBuf::from(path)),
            }
        }

        let data_dir = data_dir
            .or_else(|| env(ENV_DATA_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let wallet_path = wallet_path
            .or_else(|| env(ENV_WALLET_PATH).map(PathBuf::from))
            .unwrap_or_else(|| data_dir.join(DEFAULT_WALLET_PATH));

        Ok(Self {
            data_dir,
            wallet_path,
            blocks,
            quiet,
            reset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<NodeConfig, ConfigError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeConfig::from_args(args.iter().map(|s| s.to_string()), |k| env.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = parse(&[], &[]).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(cfg.wallet_path, PathBuf::from(DEFAULT_DATA_DIR).join(DEFAULT_WALLET_PATH));
        assert_eq!(cfg.chain_path(), PathBuf::from(DEFAULT_DATA_DIR).join(DEFAULT_CHAIN_PATH));
        assert_eq!(cfg.blocks, DEFAULT_BLOCK_COUNT);
        assert!(!cfg.quiet);
        assert!(!cfg.reset);
    }

    #[test]
    fn arguments_override_environment() {
        let cfg = parse(
            &["/data", "--wallet", "/keys/w.key", "--blocks", "7", "--quiet", "--reset"],
            &[(ENV_DATA_DIR, "/env"), (ENV_WALLET_PATH, "/env/w.key")],
        )
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/data"));
        assert_eq!(cfg.wallet_path, PathBuf::from("/keys/w.key"));
        assert_eq!(cfg.blocks, 7);
        assert!(cfg.quiet);
        assert!(cfg.reset);
    }

    #[test]
    fn environment_overrides_defaults() {
        let cfg = parse(&[], &[(ENV_DATA_DIR, "/env")]).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/env"));
        assert_eq!(cfg.wallet_path, PathBuf::from("/env").join(DEFAULT_WALLET_PATH));

        let cfg = parse(&["/data"], &[(ENV_WALLET_PATH, "/env/w.key")]).unwrap();
        assert_eq!(cfg.wallet_path, PathBuf::from("/env/w.key"));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse(&["--wallet"], &[]),
            Err(ConfigError::MissingValue("--wallet".into()))
        );
        assert_eq!(
            parse(&["--blocks", "0"], &[]),
            Err(ConfigError::InvalidBlockCount("0".into()))
        );
        assert_eq!(
            parse(&["--blocks", "many"], &[]),
            Err(ConfigError::InvalidBlockCount("many".into()))
        );
        assert_eq!(
            parse(&["a", "b"], &[]),
            Err(ConfigError::UnexpectedArgument("b".into()))
        );
        assert_eq!(
            parse(&["--verbose"], &[]),
            Err(ConfigError::UnexpectedArgument("--verbose".into()))
        );
        assert_eq!(parse(&["-h"], &[]), Err(ConfigError::HelpRequested));
    }
}
