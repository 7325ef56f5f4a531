use std::process::ExitCode;

use clap::{Parser, Subcommand};

use fizzy_pop::commands::run::RunArgs;
use fizzy_pop::{commands, error, telemetry};

#[derive(Debug, Parser)]
#[command(
    name = "fizzy-pop",
    version,
    about = "Relay Fizzy notifications to OpenClaw agents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll Fizzy for every configured agent and forward notifications
    Run(RunArgs),
    /// Print the JSON Schema for the config file
    Schema,
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::Schema => "schema",
        }
    }

    const fn verbose(&self) -> bool {
        match self {
            Self::Run(args) => args.verbose,
            Self::Schema => false,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    telemetry::init(cli.command.verbose());

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match &cli.command {
        Commands::Run(args) => args.execute(),
        Commands::Schema => commands::schema::run_schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<error::ExitError>() {
                eprintln!("error: {exit_err}");
                exit_err.exit_code()
            } else {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }
}
