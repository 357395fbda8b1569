use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gishmas-cli", version, about = "Gishmas CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the sus test
    Quiz {
        #[command(subcommand)]
        action: commands::quiz::QuizAction,
    },
    /// Browse the guest list
    Guests {
        #[command(subcommand)]
        action: commands::guests::GuestsAction,
    },
    /// Show the twelve-day grid
    Days(commands::days::DaysArgs),
    /// Walk the page flow interactively over stdin
    Play(commands::play::PlayArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        match cli.command {
            Commands::Quiz { action } => commands::quiz::run(action).await,
            Commands::Guests { action } => commands::guests::run(action).await,
            Commands::Days(args) => commands::days::run(args),
            Commands::Play(args) => commands::play::run(args).await,
            Commands::Config { action } => commands::config::run(action),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
