//! wt-swap - Swap between the web extension and local desktop source layouts.

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process;
use wt_maint::cli::SwapCli;
use wt_maint::commands::{self, CommandResult, SwapOptions};
use wt_maint::logging;

fn main() {
    let cli = SwapCli::parse();
    logging::init();

    let root = match cli.root {
        Some(path) => {
            if !path.is_dir() {
                eprintln!(
                    "Error: Specified root is not a directory: {}",
                    path.display()
                );
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let options = SwapOptions {
        root,
        config: cli.config,
        dry_run: cli.dry_run,
        no_install: cli.no_install,
    };

    match commands::swap_layout(&options) {
        Ok(result) => {
            if cli.json {
                println!("{}", result.to_json());
            } else {
                println!("{}", result.to_human());
            }
        }
        Err(e) => {
            if cli.json {
                eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
    }
}
