mod cli;
mod commands;
mod config;
mod constants;
mod error;
mod models;
mod server;
mod services;
mod stats;

#[tokio::main]
async fn main() {
    if let Err(err) = cli::run().await {
        eprintln!("❌ {}", err);
        std::process::exit(1);
    }
}
