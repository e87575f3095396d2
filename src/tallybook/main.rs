//! `tally`: command-line client for the tallybook trackers.
//!
//! Every invocation is one load → change → save cycle against the data
//! directory (`--data-dir`, `TALLY_DATA_DIR`, or the platform data dir).

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
