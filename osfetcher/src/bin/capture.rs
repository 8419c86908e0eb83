use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use osfetcher::{
    fixture::{save_resources, save_topology},
    OpenStackCredentials, OpenStackFetcher,
};

#[derive(Parser, Debug)]
#[command(
    name = "osfetcher-capture",
    about = "Capture live OpenStack API responses as reusable fixtures",
    after_help = "Example:\n  cargo run -p osfetcher --bin capture -- \\\n    --env-file ./openrc.env --output-dir fixtures/devstack\n\nReplay with:\n  osfetcher --fixture fixtures/devstack resources"
)]
struct Args {
    /// Directory receiving resources.json and topology.json
    #[arg(long, default_value = "captures")]
    output_dir: PathBuf,

    /// openrc-style env file with the OS_* credentials
    #[arg(long, env = "OS_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Skip the Vitrage topology, for clouds without the rca service
    #[arg(long)]
    skip_topology: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let credentials = match &args.env_file {
        Some(path) => OpenStackCredentials::from_env_file(path),
        None => OpenStackCredentials::from_env(),
    }
    .context("OpenStack credentials are incomplete")?;

    let fetcher = OpenStackFetcher::connect(&credentials)
        .await
        .context("failed to connect to OpenStack")?;

    log::info!("Fetching resources …");
    let raw = fetcher
        .fetch_raw()
        .await
        .context("resource listing failed")?;
    let path = save_resources(&args.output_dir, &raw).context("failed to save resources")?;
    log::info!("Saved {:?}", path);

    if !args.skip_topology {
        log::info!("Fetching topology …");
        let document = fetcher
            .fetch_topology()
            .await
            .context("topology request failed")?;
        let path = save_topology(&args.output_dir, &document).context("failed to save topology")?;
        log::info!("Saved {:?}", path);
    }

    log::info!("Capture finished successfully");
    Ok(())
}
