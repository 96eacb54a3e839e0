//! CLI argument definitions for satquery.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `discos` | Query the DISCOS physical-properties catalog |
//! | `celestrak` | Filter the local CelesTrak SATCAT snapshot |
//! | `objects` | Merged SATCAT + DISCOS + magnitude query |
//! | `tle` | Download the latest TLEs from Space-Track |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | per-user `satquery/config.toml` | TOML configuration file |
//! | `--data-dir` | per-user data directory | Where SATCAT, qs.mag and credentials live |
//! | `--format` | `table` | Output format (table, json, csv) |
//! | `--output` | stdout | Write the rendered result to a file |
//! | `--save` | `false` | Also save the table as CSV |
//!
//! # Examples
//!
//! ```bash
//! # Non-payload objects in low orbit, largest RCS first
//! satquery objects -f PAYLOAD=false -f DECAYED=false -f MEAN_ALT=400,900 --sort -RCSAvg
//!
//! # Cylindrical objects heavier than a tonne
//! satquery discos -f SHAPE=Cyl -f MASS=1000,20000 --format json
//!
//! # TLEs for ids listed in a file
//! satquery tle ids.txt --dir TLE --clear
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Query, filter and merge space-object catalogs.
#[derive(Debug, Parser)]
#[command(
    name = "satquery",
    author,
    version,
    about = "Space-object catalog query CLI",
    long_about = "satquery filters and merges metadata about orbiting and re-entered space \
objects from ESA DISCOS, the CelesTrak SATCAT snapshot and the qs.mag magnitude file, \
and downloads the latest TLEs from Space-Track.\n\
\n\
Constraints are given as repeated -f NAME=VALUE pairs:\n\
  ranges   MASS=100,500\n\
  lists    SHAPE=Cyl,Sphere  (append + to require every term)\n\
  booleans DECAYED=false\n\
  ids      NORAD_ID=25544,43205 or NORAD_ID=ids.txt\n\
\n\
Use 'satquery <command> --help' for command-specific help."
)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Data directory holding satcat.csv, qs.mag and credential files.
    #[arg(long, global = true, value_name = "DIR", env = "SATQUERY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the rendered output to this file instead of stdout.
    #[arg(long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Save the result table as `<catalog>_<YYYYMMDD>.csv`.
    #[arg(long, global = true, default_value_t = false)]
    pub save: bool,

    /// Directory used by --save.
    #[arg(long, global = true, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// JSON array of row objects.
    Json,
    /// CSV with a header row.
    Csv,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query DISCOS. Sorting happens on the server.
    Discos(QueryArgs),
    /// Filter the CelesTrak SATCAT snapshot.
    Celestrak(SnapshotQueryArgs),
    /// Merge SATCAT, DISCOS and qs.mag for the selected objects.
    Objects(SnapshotQueryArgs),
    /// Download the latest TLE of every selected object.
    Tle(TleArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Constraint as NAME=VALUE; repeat for more.
    #[arg(short = 'f', long = "filter", value_name = "NAME=VALUE", value_parser = parse_constraint)]
    pub filters: Vec<(String, String)>,

    /// Sort attribute; prefix with '-' for descending order.
    #[arg(long, value_name = "KEY", allow_hyphen_values = true)]
    pub sort: Option<String>,
}

#[derive(Debug, Args)]
pub struct SnapshotQueryArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Download a new SATCAT snapshot (and, for `objects`, a new qs.mag)
    /// when the local copy is stale.
    #[arg(long, default_value_t = false)]
    pub refresh: bool,
}

#[derive(Debug, Args)]
pub struct TleArgs {
    /// Comma-separated NORAD ids, or a file with one id per line.
    #[arg(value_name = "IDS|FILE")]
    pub ids: String,

    /// Output directory for the TLE files.
    #[arg(long, value_name = "DIR", default_value = "TLE")]
    pub dir: PathBuf,

    /// Remove existing files from the output directory first.
    #[arg(long, default_value_t = false)]
    pub clear: bool,
}

fn parse_constraint(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.trim().to_owned()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}
