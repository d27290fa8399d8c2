//! Textree CLI
//!
//! Reads tree events as JSON lines, executes the directives they carry and
//! writes the transformed stream as JSON lines.

use textree_core::cli;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
