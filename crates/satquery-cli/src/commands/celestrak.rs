use satquery_core::{Catalog, CatalogTable, CelestrakFilter};

use super::refresh_if_requested;
use crate::cli::SnapshotQueryArgs;
use crate::error::CliError;

pub async fn run(args: &SnapshotQueryArgs, catalog: &Catalog) -> Result<CatalogTable, CliError> {
    let filter = CelestrakFilter::from_pairs(
        args.query.filters.iter().map(|(name, value)| (name, value)),
    )?;
    refresh_if_requested(catalog, args.refresh).await?;

    Ok(catalog
        .celestrak_query(&filter, args.query.sort.as_deref())
        .await?)
}
