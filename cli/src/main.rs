//! Command-line client for clubpage.
//!
//! Commands:
//! - links: list, add, move and remove profile links (social icons move as
//!   one group)
//! - notices: an event's notice board
//! - documents: documents attached to an event or a series
//! - events / series: create and list the scopes above
//!
//! Configuration via environment:
//! - CLUBPAGE_URL: Base URL of the clubpage server (default: http://localhost:3000)
//! - CLUBPAGE_TOKEN: JWT Bearer token for authentication
//! - CLUBPAGE_DEV_USER: User id sent as `X-User-Id` to a dev server without a token

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use commands::{
    Context, documents::DocumentsArgs, events::EventsArgs, events::SeriesArgs, links::LinksArgs,
    notices::NoticesArgs,
};

/// Clubpage CLI
///
/// Manage and reorder your page from the command line. Prints JSON by
/// default; pass --human for formatted output.
#[derive(Parser)]
#[command(name = "clubpage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Clubpage server URL
    #[arg(
        long,
        env = "CLUBPAGE_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    url: String,

    /// JWT Bearer token for authentication
    #[arg(long, env = "CLUBPAGE_TOKEN", global = true)]
    token: Option<String>,

    /// Act as this user against a server that accepts dev identities
    #[arg(long, env = "CLUBPAGE_DEV_USER", global = true)]
    dev_user: Option<Uuid>,

    /// Log reorder diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile links
    Links(LinksArgs),

    /// Event notice boards
    Notices(NoticesArgs),

    /// Event and series documents
    Documents(DocumentsArgs),

    /// Events
    Events(EventsArgs),

    /// Event series
    Series(SeriesArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = match commands::build_client(cli.token.as_deref(), cli.dev_user) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let ctx = Context {
        client,
        url: cli.url,
        human: cli.human,
    };

    let result = match cli.command {
        Commands::Links(args) => commands::links::execute(&ctx, args).await,
        Commands::Notices(args) => commands::notices::execute(&ctx, args).await,
        Commands::Documents(args) => commands::documents::execute(&ctx, args).await,
        Commands::Events(args) => commands::events::execute(&ctx, args).await,
        Commands::Series(args) => commands::events::execute_series(&ctx, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_link_move() {
        let cli = Cli::try_parse_from(["clubpage", "links", "move", "social", "to", "0"]).unwrap();
        assert!(matches!(cli.command, Commands::Links(_)));

        let err = Cli::try_parse_from(["clubpage", "documents", "list"]);
        assert!(err.is_err(), "documents needs --event or --series");
    }
}
