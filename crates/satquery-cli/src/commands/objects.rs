use satquery_core::{Catalog, CatalogTable, ObjectsFilter};

use super::{refresh_if_requested, refresh_magnitudes_if_requested};
use crate::cli::SnapshotQueryArgs;
use crate::error::CliError;

pub async fn run(args: &SnapshotQueryArgs, catalog: &Catalog) -> Result<CatalogTable, CliError> {
    let filter =
        ObjectsFilter::from_pairs(args.query.filters.iter().map(|(name, value)| (name, value)))?;
    refresh_if_requested(catalog, args.refresh).await?;
    refresh_magnitudes_if_requested(catalog, args.refresh).await?;

    let table = catalog
        .objects_query(&filter, args.query.sort.as_deref())
        .await?;
    tracing::info!(rows = table.len(), "merged catalog ready");
    Ok(table)
}
