use std::path::{Path, PathBuf};

use time::Date;

use crate::ValidationError;

/// Two-bound range constraint. `lo <= hi` is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub lo: T,
    pub hi: T,
}

pub type NumericRange = Range<f64>;
pub type DateRange = Range<Date>;

impl<T: PartialOrd> Range<T> {
    pub const fn new(lo: T, hi: T) -> Self {
        Self { lo, hi }
    }

    /// Strict `lo < value < hi`.
    pub fn contains_exclusive(&self, value: &T) -> bool {
        *value > self.lo && *value < self.hi
    }
}

/// Substring match over a list of terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Any term matches (OR).
    Any(Vec<String>),
    /// Every term matches (AND).
    All(Vec<String>),
}

impl TextMatch {
    /// Trailing token that turns a term list into an AND match.
    pub const AND_MARKER: &'static str = "+";

    /// Builds a match from user tokens: a trailing `+` selects [`TextMatch::All`]
    /// over the remaining tokens, otherwise [`TextMatch::Any`] over all of them.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if terms.last().map(String::as_str) == Some(Self::AND_MARKER) {
            terms.pop();
            Self::All(terms)
        } else {
            Self::Any(terms)
        }
    }

    pub fn terms(&self) -> &[String] {
        match self {
            Self::Any(terms) | Self::All(terms) => terms,
        }
    }
}

/// NORAD catalog number selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSelector {
    Literal(Vec<u32>),
    /// Whitespace-separated catalog numbers; lines starting with `#` are skipped.
    FromFile(PathBuf),
}

impl IdSelector {
    pub fn one(id: u32) -> Self {
        Self::Literal(vec![id])
    }

    /// Parses textual input. A value containing `.` names a file, anything
    /// else is a comma-separated list of catalog numbers.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.contains('.') {
            return Ok(Self::FromFile(PathBuf::from(raw)));
        }

        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(parse_norad_id)
            .collect::<Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            return Err(ValidationError::EmptyIdList);
        }
        Ok(Self::Literal(ids))
    }

    /// Reads a file selector into a literal list; literal selectors pass through.
    pub async fn load(self) -> Result<Self, ValidationError> {
        match self {
            Self::Literal(_) => Ok(self),
            Self::FromFile(path) => load_id_file(&path).await.map(Self::Literal),
        }
    }

    /// Ids of a literal selector. File selectors must go through
    /// [`IdSelector::load`] first.
    pub fn ids(&self) -> Result<&[u32], ValidationError> {
        match self {
            Self::Literal(ids) => Ok(ids),
            Self::FromFile(path) => Err(ValidationError::IdFile {
                path: path.display().to_string(),
                message: String::from("identifier file was not loaded"),
            }),
        }
    }
}

pub fn parse_norad_id(token: &str) -> Result<u32, ValidationError> {
    token
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidNoradId {
            value: token.to_owned(),
        })
}

async fn load_id_file(path: &Path) -> Result<Vec<u32>, ValidationError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|error| ValidationError::IdFile {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
    parse_id_list(&contents)
}

pub fn parse_id_list(contents: &str) -> Result<Vec<u32>, ValidationError> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(parse_norad_id)
        .collect()
}
