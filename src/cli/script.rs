// This is the text front end of the ledger - one command per line, the syntax store scripts use
// It only turns words into ledger calls and ledger results into text, the rules live in the ledger

use crate::config::LedgerConfig;
use crate::core::Ledger;
use crate::error::{LedgerError, Result};
use crate::utils::{HashingService, Sha256Hasher};
use log::warn;
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Split a script line into words, keeping quoted runs together.
///
/// `"double"` and `'single'` quotes group words and are stripped.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

// A parsed line: command word, one positional argument, then keyword/value pairs
struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    fn command(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or_default()
    }

    fn positional(&self) -> Result<&str> {
        self.tokens.get(1).map(String::as_str).ok_or_else(|| {
            LedgerError::InvalidCommand(format!("{} needs an argument", self.command()))
        })
    }

    fn keyword(&self, name: &str) -> Option<&str> {
        self.tokens
            .get(2..)
            .unwrap_or_default()
            .chunks(2)
            .find(|pair| pair.len() == 2 && pair[0] == name)
            .map(|pair| pair[1].as_str())
    }

    fn required(&self, name: &str) -> Result<&str> {
        self.keyword(name).ok_or_else(|| {
            LedgerError::InvalidCommand(format!("{} is missing '{name}'", self.command()))
        })
    }

    fn number(&self, name: &str) -> Result<u64> {
        let value = self.required(name)?;
        value.parse::<u64>().map_err(|_| {
            LedgerError::InvalidCommand(format!("'{name}' must be a whole number, got {value}"))
        })
    }
}

/// Feeds script commands to a ledger and renders the results as text
pub struct CommandProcessor {
    defaults: LedgerConfig,
    hasher: Arc<dyn HashingService>,
    ledger: Option<Ledger>,
}

impl CommandProcessor {
    /// `defaults` supplies everything `create-ledger` does not name
    pub fn new(defaults: LedgerConfig) -> CommandProcessor {
        Self::with_hasher(defaults, Arc::new(Sha256Hasher))
    }

    pub fn with_hasher(
        defaults: LedgerConfig,
        hasher: Arc<dyn HashingService>,
    ) -> CommandProcessor {
        CommandProcessor {
            defaults,
            hasher,
            ledger: None,
        }
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        self.ledger.as_ref()
    }

    fn require_ledger(&self) -> Result<&Ledger> {
        self.ledger.as_ref().ok_or(LedgerError::NoLedger)
    }

    /// Run one line. Blank lines and `#` comments produce `None`.
    pub fn process_command(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let args = CommandLine {
            tokens: tokenize(trimmed),
        };

        let output = match args.command() {
            "create-ledger" => self.create_ledger(&args)?,
            "create-account" => {
                let address = self.require_ledger()?.create_account(args.positional()?)?;
                format!("Created account {address}")
            }
            "process-transaction" => {
                let ledger = self.require_ledger()?;
                let id = ledger.create_transaction(
                    args.positional()?,
                    args.number("amount")?,
                    args.number("fee")?,
                    args.keyword("note").unwrap_or_default(),
                    args.required("payer")?,
                    args.required("receiver")?,
                )?;
                format!("Processed transaction {id}")
            }
            "get-account-balance" => {
                let address = args.positional()?;
                let balance = self.require_ledger()?.get_account_balance(address)?;
                format!("{address}: {balance}")
            }
            "get-account-balances" => {
                let balances = self.require_ledger()?.get_account_balances()?;
                serde_json::to_string_pretty(&balances)?
            }
            "get-block" => {
                let number = args.positional()?;
                let number = number.parse::<u64>().map_err(|_| {
                    LedgerError::InvalidCommand(format!("block number must be numeric: {number}"))
                })?;
                let block = self.require_ledger()?.get_block(number)?;
                serde_json::to_string_pretty(block.as_ref())?
            }
            "get-transaction" => {
                let transaction = self.require_ledger()?.get_transaction(args.positional()?)?;
                serde_json::to_string_pretty(&transaction)?
            }
            "validate" => {
                self.require_ledger()?.validate()?;
                "Blockchain valid".to_string()
            }
            other => {
                return Err(LedgerError::InvalidCommand(format!("unknown command {other}")));
            }
        };

        Ok(Some(output))
    }

    fn create_ledger(&mut self, args: &CommandLine) -> Result<String> {
        let name = args.positional()?;
        let description = args
            .keyword("description")
            .unwrap_or(self.defaults.description.as_str());
        let seed = args.keyword("seed").unwrap_or(self.defaults.seed.as_str());

        let config = self
            .defaults
            .clone()
            .with_identity(name, description, seed);
        let ledger = Ledger::with_config(config, Arc::clone(&self.hasher))?;
        let output = format!(
            "Created ledger {} ({}), seed {}",
            ledger.get_name(),
            ledger.get_description(),
            ledger.get_seed()
        );
        self.ledger = Some(ledger);
        Ok(output)
    }

    /// Run every line of a script, writing outputs and error reports to `out`.
    ///
    /// A failing line is reported and skipped. Returns how many lines failed.
    pub fn process_script<R, W>(&mut self, reader: R, out: &mut W) -> Result<usize>
    where
        R: BufRead,
        W: Write,
    {
        let mut failures = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;

            match self.process_command(&line) {
                Ok(Some(output)) => writeln!(out, "{output}")?,
                Ok(None) => {}
                Err(e) => {
                    failures += 1;
                    warn!("Script line {line_number} failed ({}): {e}", e.kind());
                    writeln!(
                        out,
                        "SCRIPT ERROR at line {line_number}: {} ({})",
                        e,
                        line.trim()
                    )?;
                }
            }
        }

        Ok(failures)
    }
}
