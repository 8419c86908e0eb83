use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nebulagen::{
    config::{OutputConfig, SpaceConfig},
    orchestrator::RunOutput,
    GraphExporter,
};
use osfetcher::{FixtureService, ImageProvenance, OpenStackCredentials, OpenStackFetcher};

#[derive(Parser, Debug)]
#[command(
    name = "osfetcher",
    about = "Export OpenStack resources or the Vitrage topology as NebulaGraph nGQL/CSV files"
)]
struct Cli {
    /// Root directory for vertices/, edges/ and schema.ngql
    #[arg(long, env = "NEBULAGEN_OUTPUT_DIR", default_value = "output", global = true)]
    output_dir: PathBuf,

    /// Graph space named in schema.ngql
    #[arg(long, env = "NEBULAGEN_SPACE", default_value = "openstack", global = true)]
    space: String,

    /// Read captured API responses from this directory instead of calling OpenStack
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// openrc-style env file with the OS_* credentials
    #[arg(long, env = "OS_ENV_FILE", global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Images, keypairs, volumes, snapshots and instances with their relationships
    Resources(ResourcesArgs),
    /// The Vitrage entity graph of all tenants
    Topology,
}

#[derive(Args, Debug)]
struct ResourcesArgs {
    /// Marks an image as uploaded from a volume; repeatable
    #[arg(long = "image-provenance", value_name = "IMAGE=VOLUME")]
    image_provenance: Vec<ImageProvenance>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let fetcher = build_fetcher(&cli).await?;
    let exporter = GraphExporter::new(
        OutputConfig::new(&cli.output_dir),
        SpaceConfig::new(cli.space.as_str()),
    );

    let output = match cli.command {
        Command::Resources(args) => {
            let inventory = fetcher
                .with_provenance(args.image_provenance)
                .fetch_inventory()
                .await
                .context("failed to fetch OpenStack resources")?;
            exporter
                .export_inventory(&inventory)
                .context("failed to export resource graph")?
        }
        Command::Topology => {
            let document = fetcher
                .fetch_topology()
                .await
                .context("failed to fetch Vitrage topology")?;
            exporter
                .export_topology(&document)
                .context("failed to export topology graph")?
        }
    };

    report(&output);
    log::info!("Export finished under {:?}", cli.output_dir);
    Ok(())
}

async fn build_fetcher(cli: &Cli) -> Result<OpenStackFetcher> {
    if let Some(dir) = &cli.fixture {
        log::info!("Replaying fixtures from {:?}", dir);
        return Ok(OpenStackFetcher::new(Arc::new(FixtureService::new(dir))));
    }

    let credentials = match &cli.env_file {
        Some(path) => OpenStackCredentials::from_env_file(path),
        None => OpenStackCredentials::from_env(),
    }
    .context("OpenStack credentials are incomplete")?;

    OpenStackFetcher::connect(&credentials)
        .await
        .context("failed to connect to OpenStack")
}

fn report(output: &RunOutput) {
    for unit in output.summary() {
        log::info!("{:<48} {:>6}", unit.unit, unit.data_count);
    }
    for unresolved in &output.diagnostics.unresolved {
        log::warn!(
            "unresolved in {}: {} -> '{}'",
            unresolved.unit,
            unresolved.anchor.as_deref().unwrap_or("?"),
            unresolved.missing_key
        );
    }
    for dangling in &output.diagnostics.dangling {
        log::warn!(
            "no vertex for endpoint in {}: '{}' -> {}",
            dangling.unit,
            dangling.missing_key,
            dangling.anchor.as_deref().unwrap_or("?")
        );
    }
}
