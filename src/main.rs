use clap::Parser;

use ordersight::interfaces::cli::Cli;

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let cli = Cli::parse();
    if let Err(err) = cli.execute().await {
        tracing::error!(error = %err, "command failed");
        std::process::exit(1);
    }
}
