use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use lammah::config::DEFAULT_LISTEN_ADDR;
use lammah::shell::{serve, AppState};
use lammah::{ArtifactStore, ServerConfig, TaskRegistry};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the per-task vectorizer and model artifacts
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Address to serve the web UI on
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR)]
    listen: String,

    /// Base URL to fetch missing artifacts from (must serve manifest.json)
    #[arg(long)]
    fetch_from: Option<String>,

    /// Remove any existing artifacts before fetching
    #[arg(short, long)]
    fresh: bool,

    /// Refuse to start unless every artifact matches the manifest digests
    #[arg(long)]
    verify: bool,
}

async fn prepare_artifacts(args: &Args) -> anyhow::Result<ArtifactStore> {
    let store = match &args.artifacts_dir {
        Some(dir) => ArtifactStore::new(dir)?,
        None => ArtifactStore::new_default()?,
    };
    info!("Using artifacts directory {:?}", store.artifacts_dir());

    if args.fresh {
        if args.fetch_from.is_none() {
            bail!("--fresh needs --fetch-from to download a replacement artifact set");
        }
        info!("Fresh download requested - removing any existing artifacts...");
        store.remove_artifacts()?;
    }

    store
        .ensure_artifacts(args.fetch_from.as_deref())
        .await
        .context("No usable artifact set")?;

    if args.verify && !store.verify_artifacts()? {
        bail!("Artifacts under {:?} do not match the manifest", store.artifacts_dir());
    }

    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting Lammah ===");
    let start_time = Instant::now();

    let store = prepare_artifacts(&args).await?;
    let registry = TaskRegistry::load(&store.registry_config()).context("Failed to load task pipelines")?;
    info!("=== Pipelines ready (took {:.2?}) ===", start_time.elapsed());

    let config = ServerConfig {
        listen_addr: args.listen,
    };
    serve(&config, AppState::new(registry)).await?;
    Ok(())
}
