//! Provisioning tool for authorization directory secrets.
//!
//! ```text
//! hash-secret [--cost N]        read a secret from stdin, print its bcrypt hash
//! hash-secret --verify <hash>   read a secret from stdin, print whether it matches
//! ```

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use token_authority::config::DEFAULT_BCRYPT_COST;
use token_authority::crypto::{hash_client_secret, verify_client_secret};

/// Hash or check a client secret read from stdin.
#[derive(Debug, Parser)]
#[command(name = "hash-secret", version)]
struct Args {
    /// bcrypt cost for the new hash (10-14)
    #[arg(long, default_value_t = DEFAULT_BCRYPT_COST, conflicts_with = "verify")]
    cost: u32,

    /// Check the secret against this hash instead of hashing it
    #[arg(long, value_name = "HASH")]
    verify: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Hash { cost: u32 },
    Verify { hash: String },
}

impl Args {
    fn action(self) -> Action {
        match self.verify {
            Some(hash) => Action::Verify { hash },
            None => Action::Hash { cost: self.cost },
        }
    }
}

/// First line of stdin without its line terminator.
fn read_secret() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn run(action: Action) -> Result<String, String> {
    let secret = read_secret().map_err(|e| format!("failed to read secret: {}", e))?;

    match action {
        Action::Hash { cost } => hash_client_secret(&secret, cost).map_err(|e| e.to_string()),
        Action::Verify { hash } => match verify_client_secret(&secret, &hash) {
            Ok(true) => Ok("match".to_string()),
            Ok(false) => Err("no match".to_string()),
            Err(e) => Err(e.to_string()),
        },
    }
}

fn main() -> ExitCode {
    let action = Args::parse().action();

    match run(action) {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            if writeln!(stdout, "{}", output).is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            let _ = writeln!(io::stderr(), "hash-secret: {}", message);
            ExitCode::FAILURE
        }
    }
}
