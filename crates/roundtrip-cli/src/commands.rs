use anyhow::{Context, Result};
use tracing::info;

use roundtrip_core::{Orchestrator, RunOptions, RunReport};
use roundtrip_ingest::GitRepository;
use roundtrip_model::RoundtripConfig;
use roundtrip_service::XsugarService;
use roundtrip_state::StateStore;

use crate::cli::RunArgs;

/// Load the configuration file, or the built-in defaults, and apply CLI
/// overrides.
pub fn load_config(args: &RunArgs) -> Result<RoundtripConfig> {
    let mut config = match &args.config {
        Some(path) => RoundtripConfig::load_from(path)
            .with_context(|| format!("load configuration from {}", path.display()))?,
        None => RoundtripConfig::default(),
    };
    if let Some(endpoint) = &args.service_url {
        config.service.endpoint = endpoint.clone();
    }
    if let Some(dir) = &args.state_dir {
        config.state_dir = dir.clone();
    }
    Ok(config)
}

pub fn run_category(args: &RunArgs) -> Result<RunReport> {
    let config = load_config(args)?;
    let dataset = config.dataset(&args.category)?;
    let vcs = GitRepository::new(&config.corpus_root);
    let service =
        XsugarService::from_config(&config.service).context("create conversion service client")?;
    let store = StateStore::new(&config.state_dir);
    info!(
        category = %args.category,
        corpus = %config.corpus_root.display(),
        source = %dataset.source_root.display(),
        output = %dataset.output_root.display(),
        state = %store.dir().display(),
        endpoint = service.endpoint(),
        "configuration loaded"
    );

    let options = RunOptions {
        retry_failures: args.retry_failures,
        dry_run: args.dry_run,
    };
    Orchestrator::new(&args.category, dataset, &vcs, &service, &store)
        .run(options)
        .with_context(|| format!("category {}", args.category))
}
