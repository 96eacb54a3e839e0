mod celestrak;
mod discos;
mod objects;
mod tle;

use satquery_core::{Catalog, CatalogTable, SatqueryConfig, TleFiles};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Result of one command, rendered by [`crate::output::render`].
#[derive(Debug)]
pub enum CommandOutcome {
    Table(CatalogTable),
    Tle(TleSummary),
}

#[derive(Debug)]
pub struct TleSummary {
    pub files: TleFiles,
    pub line_count: usize,
    pub missing: Vec<u32>,
}

pub async fn run(cli: &Cli) -> Result<CommandOutcome, CliError> {
    let catalog = build_catalog(cli).await?;

    match &cli.command {
        Command::Discos(args) => discos::run(args, &catalog).await.map(CommandOutcome::Table),
        Command::Celestrak(args) => celestrak::run(args, &catalog)
            .await
            .map(CommandOutcome::Table),
        Command::Objects(args) => objects::run(args, &catalog).await.map(CommandOutcome::Table),
        Command::Tle(args) => tle::run(args, &catalog).await.map(CommandOutcome::Tle),
    }
}

async fn build_catalog(cli: &Cli) -> Result<Catalog, CliError> {
    let mut config = SatqueryConfig::load(cli.config.as_deref()).await?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    tracing::debug!(?config, "configuration loaded");
    Ok(Catalog::with_reqwest(config))
}

async fn refresh_if_requested(catalog: &Catalog, refresh: bool) -> Result<(), CliError> {
    if refresh && catalog.refresh_satcat().await? {
        tracing::info!("SATCAT snapshot refreshed");
    }
    Ok(())
}

async fn refresh_magnitudes_if_requested(
    catalog: &Catalog,
    refresh: bool,
) -> Result<(), CliError> {
    if refresh && catalog.refresh_qsmag().await? {
        tracing::info!("qs.mag magnitude file refreshed");
    }
    Ok(())
}
