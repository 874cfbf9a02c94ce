mod commands;
mod errors;
mod libs;
mod logger;
mod schema;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{install, profile, reveal, version};

use crate::errors::SetupError;

#[derive(Parser)]
#[command(name = "setup-sovereign")]
#[command(about = "Bootstrap the Sovereign terminal stack", long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full provisioning pipeline
    Install {
        /// Remote source to fetch the artifacts from
        #[arg(long, env = "SOVEREIGN_SERVER", default_value = install::DEFAULT_SERVER)]
        server: String,
        /// Override the binary directory (default: ~/.sovereign/bin)
        #[arg(long)]
        bin_dir: Option<String>,
    },
    /// Show the detected platform profile without changing anything
    Profile,
    /// Clearance-gated credential status reveal
    Reveal {
        /// The clearance phrase
        phrase: String,
    },
    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);

    let result = match cli.command {
        Commands::Install { server, bin_dir } => install::run(server, bin_dir),
        Commands::Profile => {
            profile::run();
            Ok(())
        }
        Commands::Reveal { phrase } => {
            reveal::run(&phrase);
            Ok(())
        }
        Commands::Version => {
            version::run();
            Ok(())
        }
    };

    // Every fatal stage failure lands here: one explanatory line, an optional
    // manual remedy, and a non-zero termination code. No partial-success
    // reporting; the stage that failed already said what it was doing.
    if let Err(err) = result {
        log_error!("{err:#}");
        if let Some(remedy) = err.downcast_ref::<SetupError>().and_then(SetupError::remedy) {
            log_info!("Suggested remedy: {}", remedy.yellow());
        }
        std::process::exit(1);
    }
}
