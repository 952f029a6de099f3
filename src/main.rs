use clap::Parser;
use log::{error, info};
use playhive::configuration::config::Config;
use playhive::controller::controller_handler::Controller;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "playhive")]
#[command(version = "0.0.2")]
#[command(about = "Movie and series watchlist tracker")]
struct Args {
    /// TOML configuration file. Overrides every other setting when given.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    settings: Config,
}

// Not #[tokio::main]: DatabaseStorage blocks on its own runtime.
fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    println!(
        "
==============================================================================
                         PlayHive watchlist v0.0.2
==============================================================================
"
    );

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Importing configuration from {}", path.display());
            Config::from_file(path).unwrap_or_else(|e| {
                error!("Unable to import configuration from file: {}", e);
                std::process::exit(1);
            })
        }
        None => args.settings,
    };

    let controller = Controller::new(config).unwrap_or_else(|e| {
        error!("Unable to create a controller instance: {}, exiting...", e);
        std::process::exit(1);
    });

    let stdin = io::stdin();
    if let Err(e) = controller.run(stdin.lock(), io::stdout()) {
        error!("Error occured in the shell: {}, exiting...", e);
        std::process::exit(1);
    }
}
