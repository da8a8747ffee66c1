//! Nonce CLI Entry Point
//!
//! Operator tooling: key generation, password hashing and nonce
//! issue/validate against the `CIPHER_KEY` configured for the process.
//! Uses `anyhow` for command errors; library errors keep their own types.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use nonce::{
    IssueNonceUseCase, NonceConfig, NoncePayload, NoncePolicy, NonceResult, NonceScope,
    SystemClock, ValidateNonceUseCase,
};
use platform::cipher::{KEY_LEN, get_key};
use platform::password::{HashedPassword, check_password_policy, hash, verify_hash};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "nonce-cli",
    version,
    about = "Issue and check identity-bound, time-limited nonces"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a random base64 key suitable for CIPHER_KEY
    Keygen {
        /// Key length in bytes
        #[arg(long, default_value_t = KEY_LEN)]
        bytes: usize,
    },

    /// Hash a password (Argon2id, PHC string)
    Hash { password: String },

    /// Verify a password against a stored hash
    Verify { password: String, hash: String },

    /// Check a password against the password policy
    Policy { password: String },

    /// Issue a nonce
    Issue(IssueArgs),

    /// Validate a nonce
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct ScopeArgs {
    /// Subject (form name, "session", ...)
    #[arg(long)]
    subject: String,

    #[arg(long, default_value_t = 0)]
    user_id: i64,

    #[arg(long, default_value_t = 0)]
    object_id: i64,

    #[arg(long, default_value = "_")]
    salt: String,

    #[arg(long, default_value_t = 2)]
    pepper_length: usize,
}

#[derive(Args, Debug)]
struct IssueArgs {
    #[command(flatten)]
    scope: ScopeArgs,

    /// Lifetime in seconds
    #[arg(long, default_value_t = 3600, allow_negative_numbers = true)]
    ttl: i64,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    nonce: String,

    #[command(flatten)]
    scope: ScopeArgs,
}

impl ScopeArgs {
    fn scope(&self) -> NonceScope {
        NonceScope::new(self.subject.clone(), self.user_id, self.object_id)
    }

    fn policy(&self, ttl_seconds: i64) -> NoncePolicy {
        NoncePolicy::new(ttl_seconds, self.salt.clone(), self.pepper_length)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nonce_cli=info,nonce=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Keygen { bytes } => {
            if bytes != KEY_LEN {
                tracing::warn!(
                    bytes,
                    expected = KEY_LEN,
                    "Key length will be rejected as CIPHER_KEY"
                );
            }
            println!("{}", get_key(bytes));
        }
        Command::Hash { password } => {
            let phc = hash(&password).context("Failed to hash password")?;
            println!("{phc}");
        }
        Command::Verify { password, hash } => {
            let stored = HashedPassword::from_phc_string(hash.as_str())
                .context("Stored hash is not a valid PHC string")?;
            if stored.needs_rehash() {
                tracing::warn!("Hash does not use the current algorithm");
            }
            let ok = verify_hash(&password, stored.as_phc_string());
            println!("{}", if ok { "valid" } else { "invalid" });
            return Ok(exit_code(ok));
        }
        Command::Policy { password } => match check_password_policy(&password) {
            Ok(()) => println!("ok"),
            Err(e) => {
                println!("{e}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Issue(args) => {
            let config = NonceConfig::from_env().context("CIPHER_KEY is not usable")?;
            let issuer = IssueNonceUseCase::new(Arc::new(SystemClock));
            let nonce = issuer
                .execute(&args.scope.scope(), &args.scope.policy(args.ttl), &config.cipher_key)
                .context("Failed to issue nonce")?;
            println!("{nonce}");
        }
        Command::Validate(args) => {
            let config = NonceConfig::from_env().context("CIPHER_KEY is not usable")?;
            let validator = ValidateNonceUseCase::new(Arc::new(SystemClock));
            // ttl is sealed inside the nonce
            let policy = args.scope.policy(0);
            let result =
                validator.open(&args.nonce, &args.scope.scope(), &policy, &config.cipher_key);
            if let Err(e) = &result {
                tracing::debug!(reason = e.reason(), "Nonce rejected");
            }
            println!("{}", validation_line(&result));
            return Ok(exit_code(result.is_ok()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Every rejection prints the same line; the reason only goes to debug logs
fn validation_line(result: &NonceResult<NoncePayload>) -> String {
    match result {
        Ok(payload) => format!("valid (expires_at={})", payload.expires_at),
        Err(_) => "invalid".to_string(),
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
