mod cli;
mod commands;

use clap::Parser;
use cli::cmd_enums::{Cli, Commands};
use tfvm::libs::config_loading::load_config;
use tfvm::libs::utilities::assets::UreqClient;
use tfvm::{log_debug, log_error, logger};

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);
    log_debug!("[TFVM::Main] Parsed arguments: {:?}", cli);

    if let Err(e) = run(cli) {
        // `{:#}` renders the whole context chain on one line.
        log_error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.root.as_deref())?;

    match cli.command {
        Commands::List => commands::list::run(&config),
        Commands::Install { version, use_after } => {
            let client = UreqClient::new(config.request_timeout);
            commands::install::run(&config, &client, &version, use_after)
        }
        Commands::Uninstall { version } => commands::uninstall::run(&config, &version),
        Commands::Use { version } => commands::use_version::run(&config, &version),
        Commands::Current => commands::current::run(&config),
    }
}
