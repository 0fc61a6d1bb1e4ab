use clap::Parser;

use smartsub::cli::Cli;
use smartsub::commands;
use smartsub::ui::{self, prelude::*};

fn main() {
    let cli = Cli::parse();

    ui::init(cli.output, !cli.no_color);
    ui::set_debug_mode(cli.debug);

    if let Err(err) = commands::dispatch(cli) {
        emit(Level::Error, "smartsub.error", &format!("Error: {err:#}"), None);
        std::process::exit(1);
    }
}
