// This is the entry point for the ledger CLI
// It loads the ledger defaults, then either runs a command script or prints the configuration
use clap::Parser;
use log::{error, info, LevelFilter};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::process;
use store_ledger::{Command, CommandProcessor, LedgerConfig, Opt};

fn main() {
    // Info level by default, RUST_LOG still wins when it is set
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    match run_command(opt.config.as_deref(), opt.command) {
        Ok(0) => {}
        Ok(failures) => {
            error!("{failures} script line(s) failed");
            process::exit(1);
        }
        Err(e) => {
            error!("Error: {e}");
            process::exit(1);
        }
    }
}

// Defaults come from the config file if one was given, then LEDGER_* variables on top
fn load_config(path: Option<&Path>) -> store_ledger::Result<LedgerConfig> {
    let config = match path {
        Some(path) => LedgerConfig::from_file(path)?,
        None => LedgerConfig::default(),
    };
    config.with_env_overrides()
}

fn run_command(
    config_path: Option<&Path>,
    command: Command,
) -> Result<usize, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    match command {
        Command::Run { script } => {
            let mut processor = CommandProcessor::new(config);
            let stdout = io::stdout();
            let mut out = stdout.lock();

            let failures = match script {
                Some(path) => {
                    info!("Running script {}", path.display());
                    let file = File::open(&path)
                        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
                    processor.process_script(BufReader::new(file), &mut out)?
                }
                None => processor.process_script(io::stdin().lock(), &mut out)?,
            };
            Ok(failures)
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(0)
        }
    }
}
