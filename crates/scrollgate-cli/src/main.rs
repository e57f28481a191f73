use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "scrollgate-cli", version, about = "Scrollgate CLI")]
struct Cli {
    /// Session (tab) whose volatile state to use
    #[arg(long, global = true, default_value = "default")]
    session: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed one input event (scroll, move, key)
    Input {
        /// Input kind
        kind: String,
    },
    /// Print the limiter snapshot as JSON
    Status,
    /// Run one background tick (idle reset, lockout expiry)
    Tick,
    /// Read input kinds from stdin, one per line, ticking in the background
    Watch,
    /// Run a scroll sequence on a virtual clock with in-memory storage
    Simulate(commands::simulate::SimulateArgs),
    /// Check whether a page URL activates the limiter
    Gate {
        /// Page URL
        url: String,
    },
    /// Session (tab) management
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let session = cli.session;
    let result = match cli.command {
        Commands::Input { kind } => commands::page::input(&session, &kind),
        Commands::Status => commands::page::status(&session),
        Commands::Tick => commands::page::tick(&session),
        Commands::Watch => commands::watch::run(&session),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Gate { url } => commands::gate::run(&url),
        Commands::Session { action } => commands::session::run(&session, action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
