//! wt-rename - Rename tracked workspace files to timestamp-based names.

use clap::Parser;
use std::process;
use wt_maint::cli::RenameCli;
use wt_maint::commands::{self, CommandResult};
use wt_maint::logging;

fn main() {
    let cli = RenameCli::parse();
    logging::init();

    match commands::rename_workspace(&cli.workspace) {
        Ok(report) => println!("{}", report.to_human()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
