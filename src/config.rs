use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// Default HTTP API port.
pub const DEFAULT_HTTP_PORT: u16 = 12345;

/// Default ledger snapshot filename, relative to the working directory.
const DEFAULT_LEDGER_FILE: &str = "hexmint-ledger.json";

#[derive(Parser, Debug)]
#[command(name = "hexmint", version, about = "Mints unique, non-speakable hex codes over HTTP")]
pub struct Cli {
    /// HTTP API port
    #[arg(long, env = "HEXMINT_PORT", default_value = "12345")]
    pub port: u16,

    /// Address to bind the HTTP listener to
    #[arg(long, env = "HEXMINT_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Ledger snapshot path
    #[arg(long, env = "HEXMINT_LEDGER", default_value = DEFAULT_LEDGER_FILE)]
    pub ledger: PathBuf,

    /// Word list file, one word per line (default: embedded list)
    #[arg(long, env = "HEXMINT_WORDS", value_name = "PATH")]
    pub words: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "HEXMINT_LOG", default_value = "info")]
    pub log_level: String,
}

/// Resolved configuration used at runtime.
pub struct Config {
    pub http_port: u16,
    pub bind: IpAddr,
    pub ledger_path: PathBuf,
    pub words_path: Option<PathBuf>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            http_port: cli.port,
            bind: cli.bind,
            ledger_path: cli.ledger.clone(),
            words_path: cli.words.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            bind: IpAddr::from([127, 0, 0, 1]),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            words_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_resolve() {
        let cli = Cli::parse_from(["hexmint"]);
        let config = Config::from_cli(&cli);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(config.bind, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.ledger_path, PathBuf::from(DEFAULT_LEDGER_FILE));
        assert!(config.words_path.is_none());
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli::parse_from([
            "hexmint",
            "--port",
            "8080",
            "--bind",
            "0.0.0.0",
            "--ledger",
            "/tmp/codes.json",
        ]);
        let config = Config::from_cli(&cli);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.bind, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(config.ledger_path, PathBuf::from("/tmp/codes.json"));
    }
}
