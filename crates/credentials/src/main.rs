use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoreel_credentials::prompt::{Prompter, TerminalPrompter};
use autoreel_credentials::{CredentialChain, CredentialResult, CredentialStore, Credentials};

/// Manage the encrypted login credentials.
#[derive(Parser)]
#[command(name = "autoreel-credentials", version, about)]
struct Cli {
    /// Directory holding the key and credential files
    #[arg(long, env = "CREDENTIAL_DIR", default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt and store credentials (prompts for anything not given)
    Save {
        #[arg(long)]
        email: Option<String>,
    },

    /// Show the stored email and a masked password
    Show,

    /// Delete the stored credentials
    Clear {
        /// Also delete the encryption key
        #[arg(long)]
        with_key: bool,
    },

    /// Resolve credentials: environment, then store, then prompt
    Resolve,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autoreel_credentials=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Credential command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CredentialResult<()> {
    let store = CredentialStore::open(&cli.dir)?;

    match cli.command {
        Commands::Save { email } => {
            let prompter = TerminalPrompter;
            let email = match email {
                Some(e) => e,
                None => prompter.read_line("Email: ")?,
            };
            let password = prompter.read_secret("Password: ")?;
            store.save(&Credentials::new(email, password))?;
            println!("Credentials saved to {}", store.credentials_path().display());
        }
        Commands::Show => match store.load() {
            Some(creds) => {
                println!("email:    {}", creds.email);
                println!("password: {}", creds.masked_password());
                println!("saved:    {}", creds.timestamp.to_rfc3339());
            }
            None => println!("No stored credentials"),
        },
        Commands::Clear { with_key } => {
            store.clear(with_key)?;
            println!("Credentials cleared");
        }
        Commands::Resolve => {
            let resolved = CredentialChain::standard(store).resolve()?;
            println!(
                "Using credentials for {} (from {})",
                resolved.credentials.email, resolved.source
            );
        }
    }
    Ok(())
}
