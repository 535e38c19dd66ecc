//! Entry point for the `hotel-cancel` command-line tool.

use clap::Parser;
use hotel_cancel::cli::{self, Cli};
use hotel_cancel::logging;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.log_dir.as_deref()) {
        eprintln!("File logging disabled: {err}");
        if let Err(err) = logging::init_stderr_only() {
            eprintln!("Logging disabled: {err}");
        }
    }
    let mut stdout = std::io::stdout().lock();
    if let Err(err) = cli::run(cli, &mut stdout) {
        tracing::error!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
