//! Continuable CLI
//!
//! Runs JSON block programs, drives them through their suspensions and
//! persists suspended programs as snapshots that can be resumed later.

use continuable::cli;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
