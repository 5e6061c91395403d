use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "store-ledger")]
pub struct Opt {
    #[arg(
        long,
        global = true,
        help = "TOML file with ledger defaults (batch_size, min_fee, max_supply, ...)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "run", about = "Run a ledger command script")]
    Run {
        #[arg(help = "Script file to run, reads stdin when omitted")]
        script: Option<PathBuf>,
    },
    #[command(name = "show-config", about = "Print the effective ledger configuration")]
    ShowConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_config() {
        let opt = Opt::parse_from(["store-ledger", "run", "script.txt", "--config", "l.toml"]);
        assert_eq!(opt.config, Some(PathBuf::from("l.toml")));
        match opt.command {
            Command::Run { script } => assert_eq!(script, Some(PathBuf::from("script.txt"))),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_from_stdin() {
        let opt = Opt::parse_from(["store-ledger", "run"]);
        assert!(matches!(opt.command, Command::Run { script: None }));
        assert!(opt.config.is_none());
    }
}
