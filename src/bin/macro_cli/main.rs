//! Interactive terminal front end for the macro tracker.
//!
//! ```bash
//! # Sign in (or register) interactively
//! macro-cli
//!
//! # Resume an existing account
//! macro-cli --user-id 0190f5c2-7a1e-7c3a-9f4e-2b8d6a1c3e5f
//! ```

mod commands;
mod prompt;

use clap::Parser;
use dotenv::dotenv;
use env_logger::Env;
use log::error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use macro_tracker::config::Config;
use macro_tracker::db;
use macro_tracker::fdc::FdcClient;

use commands::{parse_command, sign_in, CliError, Command, Session, HELP};
use prompt::Prompt;

#[derive(Parser)]
#[command(
    name = "macro-cli",
    about = "Track meals, macros and nutrition targets from the terminal"
)]
struct Cli {
    /// Existing user id to resume
    #[arg(long)]
    user_id: Option<Uuid>,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

async fn run<R: BufRead, W: Write>(session: &mut Session, prompt: &mut Prompt<R, W>) -> Result<(), CliError> {
    println!("\n{}", HELP);

    loop {
        let line = prompt.line("\n> ")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{}", usage);
                continue;
            }
        };

        let outcome = match command {
            Command::Search(query) => session.search(&query).await,
            Command::Add { fdc_id, grams, meal_type } => session.add(fdc_id, grams, meal_type).await,
            Command::Report => session.report().await,
            Command::Plan => session.plan(prompt).await,
            Command::Health => {
                session.health();
                Ok(())
            }
            Command::Goals { set: true } => session.set_goals(prompt).await,
            Command::Goals { set: false } => {
                session.show_goals();
                Ok(())
            }
            Command::History(days) => session.history(days).await,
            Command::Profile => session.profile(prompt).await,
            Command::Export => session.export().await,
            Command::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Command::Exit => {
                println!("Goodbye!");
                return Ok(());
            }
        };

        match outcome {
            Err(CliError::Io(err)) if err.kind() == io::ErrorKind::UnexpectedEof => return Err(CliError::Io(err)),
            Err(err) => println!("Error: {}", err),
            Ok(()) => {}
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Some(url) = &cli.database_url {
        std::env::set_var("DATABASE_URL", url);
    }
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let pool = match db::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Failed to connect to the database: {}", err);
            std::process::exit(1);
        }
    };

    println!("Welcome to Macro Tracker!");
    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());

    let user = match sign_in(&pool, &mut prompt, cli.user_id).await {
        Ok(user) => user,
        Err(err) => {
            error!("Could not sign in: {}", err);
            std::process::exit(1);
        }
    };

    let mut session = Session {
        pool,
        provider: Arc::new(FdcClient::new(config.fdc.clone())),
        user,
        export_dir: PathBuf::from(&config.export_dir),
    };

    if let Err(err) = run(&mut session, &mut prompt).await {
        match err {
            CliError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => println!(),
            other => error!("{}", other),
        }
    }
}
