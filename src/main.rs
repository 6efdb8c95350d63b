use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod config;
mod output;
mod telemetry;
mod video;

#[derive(Parser)]
#[command(name = "wxfeed", about = "WeChat Channels author videos as a feed")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Video(video::VideoCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // logging/tracing (stderr). Respects RUST_LOG and WXFEED_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Video(args) => video::run(args).await?,
    }

    Ok(())
}
