use clap::Parser;

use watchdesk::cli::Cli;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up WATCHDESK_BACKEND_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = watchdesk::cli::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
