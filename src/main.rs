mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::{Cli, Commands};
use config::settings::Settings;

fn main() {
    let args = Cli::parse();
    cli::output::init(args.quiet, args.verbose);
    let settings = Settings::from_cli(&args);

    let result = match &args.command {
        Commands::Apply { repo, env, yes } => {
            cli::commands::apply::execute(&settings, repo.as_deref(), env.as_deref(), *yes)
        }
        Commands::Plan { repo, env } => cli::commands::plan::execute(&settings, repo, env),
        Commands::Check => cli::commands::check::execute(&settings),
        Commands::Versions { show } => cli::commands::versions::execute(&settings, show.as_deref()),
        Commands::Log { repo, since, last } => {
            cli::commands::log::execute(&settings, repo.as_deref(), since.as_deref(), *last)
        }
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
