use std::io;

use clap::Parser;
use library_catalog::{Library, LoanLogger, SeedData, Shell, cli::Args};
use tracing::debug;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Err(e) = args.init_logging() {
        eprintln!("tracing init failed: {e}");
    }
    if args.no_color {
        colored::control::set_override(false);
    }

    // Create the catalog the shell will own
    let mut library = Library::with_history_size(args.history_size);
    library.register_observer(Box::new(LoanLogger));

    if let Some(path) = &args.seed_file {
        SeedData::from_path(path)?.apply(&mut library)?;
    } else if !args.empty {
        SeedData::sample().apply(&mut library)?;
    } else {
        debug!("starting with an empty catalog");
    }
    debug!(%library, "catalog ready");

    let stdin = io::stdin();
    let mut shell = Shell::new(library, stdin.lock(), io::stdout());
    shell.run()?;

    Ok(())
}
