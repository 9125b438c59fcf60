use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = market_relay::cli::Cli::parse();
    if let Err(e) = market_relay::run::execute(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
