use satquery_core::{Catalog, CatalogTable, DiscosFilter};

use crate::cli::QueryArgs;
use crate::error::CliError;

pub async fn run(args: &QueryArgs, catalog: &Catalog) -> Result<CatalogTable, CliError> {
    let filter = DiscosFilter::from_pairs(args.filters.iter().map(|(name, value)| (name, value)))?;
    if filter.is_empty() {
        tracing::warn!("no constraints given, every DISCOS object will be fetched");
    }

    Ok(catalog.discos_query(&filter, args.sort.as_deref()).await?)
}
