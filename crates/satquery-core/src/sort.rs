use crate::domain::Column;
use crate::ValidationError;

/// Prefix that turns a sort attribute into a descending sort.
pub const DESCENDING_PREFIX: char = '-';

/// Resolved sort request: one column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub column: Column,
    pub descending: bool,
}

impl Default for SortDirective {
    fn default() -> Self {
        Self::ascending(Column::NoradId)
    }
}

impl SortDirective {
    pub const fn ascending(column: Column) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub const fn descending(column: Column) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    /// Resolves a user sort key against the columns an entry point can sort on.
    ///
    /// `None` sorts ascending by NORAD id. A leading `-` selects descending
    /// order; the remainder must match one of `options` exactly.
    pub fn parse(raw: Option<&str>, options: &[Column]) -> Result<Self, ValidationError> {
        let Some(raw) = raw.map(str::trim) else {
            return Ok(Self::default());
        };

        let (name, descending) = match raw.strip_prefix(DESCENDING_PREFIX) {
            Some(rest) => (rest, true),
            None => (raw, false),
        };

        options
            .iter()
            .copied()
            .find(|column| column.as_str() == name)
            .map(|column| Self { column, descending })
            .ok_or_else(|| ValidationError::UnknownSortKey {
                given: raw.to_owned(),
                options: options.iter().map(|column| column.as_str()).collect(),
            })
    }
}

pub const DISCOS_SORT_OPTIONS: &[Column] = &[
    Column::CosparId,
    Column::NoradId,
    Column::ObjectClass,
    Column::Mass,
    Column::Shape,
    Column::Length,
    Column::Height,
    Column::Depth,
    Column::RcsMin,
    Column::RcsMax,
    Column::RcsAvg,
    Column::DecayDate,
];

pub const CELESTRAK_SORT_OPTIONS: &[Column] = &[
    Column::CosparId,
    Column::NoradId,
    Column::DecayDate,
    Column::Period,
    Column::Inclination,
    Column::Apogee,
    Column::Perigee,
    Column::MeanAlt,
    Column::Ecc,
    Column::LaunchDate,
    Column::LaunchSite,
    Column::Rcs,
    Column::Owner,
];

pub const OBJECTS_SORT_OPTIONS: &[Column] = &[
    Column::CosparId,
    Column::NoradId,
    Column::DecayDate,
    Column::Period,
    Column::Inclination,
    Column::Apogee,
    Column::Perigee,
    Column::MeanAlt,
    Column::Ecc,
    Column::Mass,
    Column::Length,
    Column::Height,
    Column::Depth,
    Column::RcsMin,
    Column::RcsMax,
    Column::RcsAvg,
    Column::StdMag,
    Column::LaunchDate,
    Column::Owner,
];
