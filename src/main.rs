use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use freshet::app::{AppContext, Result};
use freshet::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries JSON only.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        commands::output_json(&serde_json::json!({
            "error": true,
            "message": e.to_string(),
            "code": e.code(),
        }));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::new()?;

    match cli.command {
        Commands::Setup { clear } => commands::setup(&ctx, clear).await,
        Commands::Unread {
            num,
            feed,
            digest,
            output,
            dynamic,
            timeout,
        } => commands::unread(&ctx, num, feed, digest, output, dynamic, timeout).await,
        Commands::Article { id } => commands::article(&ctx, &id).await,
        Commands::Fetch {
            url,
            dynamic,
            timeout,
        } => commands::fetch(&ctx, &url, dynamic, timeout).await,
        Commands::Read { ids } => commands::mark_read(&ctx, ids).await,
        Commands::Star { ids } => commands::mark_starred(&ctx, ids).await,
        Commands::Subs => commands::subs(&ctx).await,
    }
}
