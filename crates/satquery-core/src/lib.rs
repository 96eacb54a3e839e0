//! # Satquery Core
//!
//! Query, filter and merge metadata about orbiting and re-entered space objects.
//!
//! ## Overview
//!
//! - **DISCOS** (ESA): physical properties, fetched page by page from a REST API
//! - **CelesTrak SATCAT**: orbital elements, filtered locally from a CSV snapshot
//! - **qs.mag**: standard magnitudes, unpacked from the McCants zip archive
//! - **Space-Track**: latest TLE element sets for selected objects
//!
//! Constraints are typed ([`DiscosFilter`], [`CelestrakFilter`],
//! [`ObjectsFilter`]) or parsed from `NAME=VALUE` pairs. The merged query
//! joins SATCAT and DISCOS one-to-one on `(COSPAR_ID, NORAD_ID)` and attaches
//! magnitudes by NORAD id.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`catalog`] | Query entry points over an explicit configuration |
//! | [`celestrak`] | SATCAT snapshot loading and mask filtering |
//! | [`config`] | File, environment and default configuration |
//! | [`dataset`] | File-age based dataset refresh |
//! | [`discos`] | DISCOS filter translation and paginated fetch |
//! | [`domain`] | Records, columns and constraint values |
//! | [`expr`] | DISCOS filter expression tree |
//! | [`filter`] | Constraint sets per entry point |
//! | [`http_client`] | HTTP client abstraction |
//! | [`merge`] | SATCAT + DISCOS + magnitude join |
//! | [`qsmag`] | Magnitude file parser |
//! | [`sort`] | Sort key resolution |
//! | [`spacetrack`] | Space-Track TLE client |
//! | [`table`] | Result table with CSV and JSON output |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use satquery_core::{Catalog, ObjectsFilter, SatqueryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::with_reqwest(SatqueryConfig::load(None).await?);
//!     let filter = ObjectsFilter::from_pairs([
//!         ("PAYLOAD", "false"),
//!         ("DECAYED", "false"),
//!         ("MEAN_ALT", "400,900"),
//!         ("RCSAvg", "5,15"),
//!     ])?;
//!
//!     let table = catalog.objects_query(&filter, Some("-RCSAvg")).await?;
//!     table.save_csv(None).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is fail-fast and never retried:
//!
//! ```rust
//! use satquery_core::{QueryError, DiscosError};
//!
//! fn describe(error: &QueryError) -> &'static str {
//!     match error {
//!         QueryError::Validation(_) => "fix the constraints",
//!         QueryError::Discos(DiscosError::EmptyResult) | QueryError::EmptyResult => {
//!             "loosen the filter"
//!         }
//!         QueryError::JoinCardinality { .. } => "duplicate catalog identifiers",
//!         _ => "provider or I/O failure",
//!     }
//! }
//! ```

pub mod catalog;
pub mod celestrak;
pub mod config;
pub mod dataset;
pub mod discos;
pub mod domain;
pub mod error;
pub mod expr;
pub mod filter;
pub mod http_client;
pub mod merge;
pub mod provider_policy;
pub mod qsmag;
pub mod sort;
pub mod spacetrack;
pub mod table;
pub mod throttling;

pub use catalog::Catalog;

pub use celestrak::{load_snapshot, read_snapshot, SatcatSnapshot, CELESTRAK_COLUMNS};

pub use config::SatqueryConfig;

pub use dataset::{download, ensure_fresh, is_stale, write_dataset};

pub use discos::{
    discos_table, sort_param, translate, ApiErrorPayload, DiscosAttributes, DiscosClient,
    DiscosError, DISCOS_COLUMNS,
};

pub use domain::{CatalogRecord, Cell, Column, IdSelector, NumericRange, Range, TextMatch};

pub use error::{QueryError, ValidationError};

pub use expr::{Expr, Op, Value};

pub use filter::{CelestrakFilter, ConstraintName, DiscosFilter, ObjectsFilter};

pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

pub use merge::{merge_objects, OBJECTS_COLUMNS};

pub use provider_policy::{DiscosPolicy, ProviderId, SpaceTrackPolicy};

pub use qsmag::{extract_qsmag, load_qsmag, parse_qsmag, MagnitudeEntry};

pub use sort::SortDirective;

pub use spacetrack::{
    SpaceTrackClient, SpaceTrackCredentials, SpaceTrackError, TleDirMode, TleFiles, TleSet,
};

pub use table::{CatalogTable, Provenance};

pub use throttling::RequestThrottle;
