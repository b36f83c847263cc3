use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use ragchat::backend::HttpBackend;
use ragchat::core::config::{self, CliOverrides, RagChatConfig};
use ragchat::core::dispatch::SubmitPolicy;
use ragchat::tui;

#[derive(Parser)]
#[command(name = "ragchat", about = "Terminal chat client for a document QA service")]
struct Args {
    /// Base URL of the search service (overrides config and RAGCHAT_BACKEND_URL)
    #[arg(short, long)]
    backend_url: Option<String>,

    /// What to do with a submission while another is in flight
    #[arg(short, long, value_enum)]
    policy: Option<SubmitPolicy>,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long, default_value = "ragchat.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}; falling back to defaults", e);
        eprintln!("ragchat: {e}; using defaults");
        RagChatConfig::default()
    });
    let cli = CliOverrides {
        backend_url: args.backend_url,
        submit_policy: args.policy,
    };
    let resolved = config::resolve(&file_config, &cli);
    log::info!(
        "ragchat starting up: backend={}, policy={}",
        resolved.backend_url,
        resolved.submit_policy.label()
    );

    let backend = Arc::new(HttpBackend::new(resolved.backend_url.clone()));
    tui::run(resolved, backend)
}
