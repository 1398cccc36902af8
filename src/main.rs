// src/main.rs — bookloop entry point

use clap::Parser;

use bookloop::cli::run::{self, RunOptions};
use bookloop::cli::{Cli, Commands};
use bookloop::infra::config::Config;
use bookloop::infra::logger;

fn main() {
    let cli = Cli::parse();

    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn", cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    let opts = RunOptions {
        threshold: cli.threshold,
        max_iterations: cli.max_iterations,
        quiet: cli.quiet,
        json: cli.json,
    };

    match cli.command {
        None | Some(Commands::Run) => run::run_catalog(&config, &opts),
        Some(Commands::Upgrade {
            title,
            author,
            target_age,
            topic,
        }) => run::run_single(
            &config,
            &opts,
            &title,
            &author,
            target_age,
            topic.as_deref(),
        ),
        Some(Commands::Config) => run::show_config(&config, &opts),
    }
}
