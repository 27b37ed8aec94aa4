use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use cloudfront_step::CascadeController;
use console_client::ConsoleClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod wizard;

use config::load_settings;
use render::render_text;
use wizard::WizardSelection;

/// Choose the CloudFront distribution and behaviors an extension deploys to.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "deploy.toml")]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    distribution: Option<String>,
    #[arg(long = "behavior")]
    behaviors: Vec<String>,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    info!(api_url = %settings.api_url, "using console api");

    let client =
        ConsoleClient::new(settings.client_options()).context("failed to build console client")?;
    let wizard = Arc::new(WizardSelection::default());
    let controller = CascadeController::new_with_hooks(
        Arc::new(client),
        Arc::clone(&wizard) as Arc<dyn cloudfront_step::SelectionHooks>,
        settings.step_config(),
    );

    controller.initialize().await;

    if let Some(id) = &args.distribution {
        controller
            .select_distribution_by_id(id)
            .await
            .with_context(|| format!("cannot select distribution '{id}'"))?;
    }
    if !args.behaviors.is_empty() {
        controller
            .select_behaviors(args.behaviors.iter().cloned())
            .context("cannot select behaviors")?;
    }

    let presentation = controller.present(&wizard.validation());
    controller.shutdown();
    info!(selection = ?wizard.snapshot(), "wizard selection");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&presentation)?);
    } else {
        print!("{}", render_text(&presentation));
    }
    Ok(())
}
