//! skywatch CLI entry point
//!
//! Aircraft proximity proxy - CLI + web server

use skywatch::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
