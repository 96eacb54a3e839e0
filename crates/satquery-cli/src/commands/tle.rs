use satquery_core::{Catalog, IdSelector, TleDirMode};

use super::TleSummary;
use crate::cli::TleArgs;
use crate::error::CliError;

pub async fn run(args: &TleArgs, catalog: &Catalog) -> Result<TleSummary, CliError> {
    let selector = IdSelector::parse(&args.ids)?;
    let set = catalog.fetch_tles(&selector).await?;

    let mode = if args.clear {
        TleDirMode::Clear
    } else {
        TleDirMode::Keep
    };
    let files = set.save(Some(args.dir.as_path()), mode).await?;

    Ok(TleSummary {
        files,
        line_count: set.lines.len(),
        missing: set.missing,
    })
}
