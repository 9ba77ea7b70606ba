mod cli;
mod commands;
mod output;
mod session;
mod templates;

use clap::Parser;

use cli::{Cli, Commands, DocsCommand, Format, UsersCommand};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = match cli.format {
        Format::Human => OutputFormat::Human,
        Format::Json => OutputFormat::Json,
    };

    // No subcommand means serve, with arguments taken from env and defaults
    let command = match cli.command {
        Some(command) => command,
        None => Cli::parse_from(["trade-manual", "serve"])
            .command
            .ok_or("serve command missing")?,
    };

    match command {
        Commands::Serve(args) => commands::serve::run(&args).await,
        Commands::Health(args) => commands::health::run(&args).await,
        Commands::Docs {
            command: DocsCommand::List(args),
        } => commands::docs::list(&args, format).await,
        Commands::Users {
            command: UsersCommand::List(args),
        } => commands::users::list(&args, format).await,
    }
}
