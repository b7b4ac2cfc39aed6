//! Uptime importer Entry Point

use clap::Parser;
use uptime_importer::cli::{self, Cli, Commands};
use uptime_importer::logging;
use uptime_importer::pingdom::PingdomClient;
use uptime_importer::shutdown::ShutdownController;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<(), anyhow::Error> {
    let config = cli::load_config(&cli.overrides);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let importer = cli::build_importer(config).await?;
            cli::run::execute(&importer).await
        }
        Commands::Watch(args) => {
            let importer = cli::build_importer(config).await?;
            let shutdown = ShutdownController::default();
            shutdown.listen_for_ctrl_c();
            cli::watch::execute(&importer, &args, shutdown).await
        }
        Commands::Checks => {
            let source = PingdomClient::new(config.pingdom)?;
            cli::checks::execute(&source).await
        }
        Commands::Window => cli::window::execute(&config.settings),
    }
}
