//! McCants `qs.mag` standard magnitude file.
//!
//! Fixed-width layout: catalog number (5 chars), name (28 chars), standard
//! magnitude (5 chars). The first and last lines are header and footer.

use std::io::{Cursor, Read};
use std::path::Path;

use crate::QueryError;

/// McCants archive holding the current `qs.mag`.
pub const DEFAULT_QSMAG_URL: &str = "https://www.prismnet.com/~mmccants/programs/qsmag.zip";
/// Name of the magnitude file inside the archive.
pub const QSMAG_ENTRY: &str = "qs.mag";

const ID_WIDTH: usize = 5;
const NAME_WIDTH: usize = 28;
const MAG_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeEntry {
    pub norad_id: u32,
    pub name: String,
    pub std_mag: f64,
}

/// Parses `qs.mag` contents, skipping lines without a numeric id and magnitude.
pub fn parse_qsmag(text: &str) -> Vec<MagnitudeEntry> {
    let lines: Vec<&str> = text.lines().collect();
    let body = match lines.len() {
        0..=2 => &[][..],
        len => &lines[1..len - 1],
    };

    body.iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let entry = parse_line(line);
            if entry.is_none() && !line.trim().is_empty() {
                tracing::warn!(
                    line = index + 2,
                    content = %line,
                    "skipping malformed magnitude line"
                );
            }
            entry
        })
        .collect()
}

fn parse_line(line: &str) -> Option<MagnitudeEntry> {
    let chars: Vec<char> = line.chars().collect();
    let field = |start: usize, width: usize| -> String {
        chars.iter().skip(start).take(width).collect::<String>()
    };

    let norad_id = field(0, ID_WIDTH).trim().parse::<u32>().ok()?;
    let name = field(ID_WIDTH, NAME_WIDTH).trim().to_owned();
    let std_mag = field(ID_WIDTH + NAME_WIDTH, MAG_WIDTH)
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())?;

    Some(MagnitudeEntry {
        norad_id,
        name,
        std_mag,
    })
}

pub async fn load_qsmag(path: &Path) -> Result<Vec<MagnitudeEntry>, QueryError> {
    let text = tokio::fs::read_to_string(path).await?;
    let entries = parse_qsmag(&text);
    tracing::info!(path = %path.display(), entries = entries.len(), "loaded magnitude table");
    Ok(entries)
}

/// Extracts the `qs.mag` entry from a downloaded zip archive.
pub async fn extract_qsmag(archive: Vec<u8>) -> Result<Vec<u8>, QueryError> {
    tokio::task::spawn_blocking(move || unzip_entry(&archive, QSMAG_ENTRY))
        .await
        .map_err(|error| QueryError::Io(std::io::Error::other(error)))?
}

fn unzip_entry(archive: &[u8], name: &str) -> Result<Vec<u8>, QueryError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut entry = archive.by_name(name)?;
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents)?;
    Ok(contents)
}
