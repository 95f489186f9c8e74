use anyhow::{Context, Result};
use clap::Parser;
use std::net::Ipv4Addr;
use std::sync::Arc;
use student_records::{
    api, config, logging,
    store::InMemoryStudentStore,
    summarization::OllamaSummaryClient,
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "student-records",
    about = "In-memory student records service with generated profile summaries"
)]
struct Cli {
    /// Port to listen on (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing();

    let summarizer = OllamaSummaryClient::from_config(config)
        .context("failed to construct summarization client")?;
    let app = api::create_router(
        Arc::new(InMemoryStudentStore::new()),
        Arc::new(summarizer),
    );

    let port = cli.port.unwrap_or(config.server_port);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!(
        ollama_url = %config.ollama_url,
        model = %config.summary_model,
        "Listening on http://0.0.0.0:{}",
        port
    );
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;

    Ok(())
}
