//! CLI entry point.

fn main() {
    if let Err(e) = fhc_cli::cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
