//! chirp-bot binary.
//!
//! Posts from `library.json` on a schedule and replies to mentions until
//! interrupted with Ctrl-C.

use chirp_bot::{AgentConfig, AgentServer};
use chirp_memory::InMemoryStore;
use chirp_social::{HttpPlatform, MentionSource, NoOpPlatform, SocialPlatform};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Automated posting agent
#[derive(Parser, Debug)]
#[command(name = "chirp-bot")]
#[command(about = "Posts weighted, non-repeating content on a schedule and replies to mentions", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./chirp.toml when present)
    #[arg(long, env = "CHIRP_CONFIG")]
    config: Option<PathBuf>,

    /// Log what would be published instead of publishing
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json_logs: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let fmt_layer = if json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

/// One platform value serving both capabilities.
fn shared<P>(platform: Arc<P>) -> (Arc<dyn SocialPlatform>, Arc<dyn MentionSource>)
where
    P: SocialPlatform + MentionSource + 'static,
{
    (platform.clone(), platform)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    let config = AgentConfig::load(cli.config.as_deref())?;

    let (platform, mentions) = if cli.dry_run {
        tracing::info!("Dry run, nothing will be published");
        shared(Arc::new(NoOpPlatform::new()))
    } else {
        let mut client = HttpPlatform::new(config.api_base_url(), config.access_token())
            .with_poll_interval(config.mention_poll_period())
            .with_request_timeout(config.request_period());
        if let Some(user_id) = config.user_id() {
            client = client.with_user_id(user_id);
        }
        shared(Arc::new(client))
    };

    let mut server = AgentServer::new(config, platform, mentions);
    if cli.dry_run {
        // Keep the configured memory store untouched.
        server = server.with_memory_store(Arc::new(InMemoryStore::new()));
    }

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
        })
        .await?;

    Ok(())
}
