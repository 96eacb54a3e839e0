//! Constraint sets for the three query entry points.
//!
//! Filters are plain structs of optional constraints; `None` means the
//! constraint is ignored. Each filter can also be built from textual
//! `(NAME, value)` pairs, which validates both the name and the shape of the
//! value before any query runs.

use std::fmt::{Display, Formatter};

use crate::domain::{parse_date, DateRange, IdSelector, NumericRange, Range, TextMatch};
use crate::ValidationError;

/// Named constraint accepted by at least one entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintName {
    CosparId,
    NoradId,
    ObjectClass,
    Payload,
    Decayed,
    DecayDate,
    Period,
    Inclination,
    Apogee,
    Perigee,
    MeanAlt,
    Ecc,
    Owner,
    TleStatus,
    Mass,
    Shape,
    Length,
    Height,
    Depth,
    RcsMin,
    RcsMax,
    RcsAvg,
}

impl ConstraintName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CosparId => "COSPAR_ID",
            Self::NoradId => "NORAD_ID",
            Self::ObjectClass => "OBJECT_CLASS",
            Self::Payload => "PAYLOAD",
            Self::Decayed => "DECAYED",
            Self::DecayDate => "DECAY_DATE",
            Self::Period => "PERIOD",
            Self::Inclination => "INCLINATION",
            Self::Apogee => "APOGEE",
            Self::Perigee => "PERIGEE",
            Self::MeanAlt => "MEAN_ALT",
            Self::Ecc => "ECC",
            Self::Owner => "OWNER",
            Self::TleStatus => "TLE_STATUS",
            Self::Mass => "MASS",
            Self::Shape => "SHAPE",
            Self::Length => "LENGTH",
            Self::Height => "HEIGHT",
            Self::Depth => "DEPTH",
            Self::RcsMin => "RCSMin",
            Self::RcsMax => "RCSMax",
            Self::RcsAvg => "RCSAvg",
        }
    }

    /// Finds `name` among `accepted`, or fails listing every accepted name.
    pub fn lookup(name: &str, accepted: &[Self]) -> Result<Self, ValidationError> {
        let name = name.trim();
        accepted
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == name)
            .ok_or_else(|| ValidationError::UnknownConstraint {
                name: name.to_owned(),
                options: accepted.iter().map(|candidate| candidate.as_str()).collect(),
            })
    }
}

impl Display for ConstraintName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DISCOS_CONSTRAINTS: &[ConstraintName] = &[
    ConstraintName::CosparId,
    ConstraintName::NoradId,
    ConstraintName::ObjectClass,
    ConstraintName::Payload,
    ConstraintName::Decayed,
    ConstraintName::DecayDate,
    ConstraintName::Mass,
    ConstraintName::Shape,
    ConstraintName::Length,
    ConstraintName::Height,
    ConstraintName::Depth,
    ConstraintName::RcsMin,
    ConstraintName::RcsMax,
    ConstraintName::RcsAvg,
];

pub const CELESTRAK_CONSTRAINTS: &[ConstraintName] = &[
    ConstraintName::CosparId,
    ConstraintName::NoradId,
    ConstraintName::Payload,
    ConstraintName::Decayed,
    ConstraintName::DecayDate,
    ConstraintName::Period,
    ConstraintName::Inclination,
    ConstraintName::Apogee,
    ConstraintName::Perigee,
    ConstraintName::MeanAlt,
    ConstraintName::Ecc,
    ConstraintName::Owner,
    ConstraintName::TleStatus,
];

pub const OBJECTS_CONSTRAINTS: &[ConstraintName] = &[
    ConstraintName::CosparId,
    ConstraintName::NoradId,
    ConstraintName::Payload,
    ConstraintName::ObjectClass,
    ConstraintName::Decayed,
    ConstraintName::DecayDate,
    ConstraintName::Period,
    ConstraintName::Inclination,
    ConstraintName::Apogee,
    ConstraintName::Perigee,
    ConstraintName::MeanAlt,
    ConstraintName::Ecc,
    ConstraintName::TleStatus,
    ConstraintName::Mass,
    ConstraintName::Shape,
    ConstraintName::Length,
    ConstraintName::Height,
    ConstraintName::Depth,
    ConstraintName::RcsMin,
    ConstraintName::RcsMax,
    ConstraintName::RcsAvg,
    ConstraintName::Owner,
];

/// Geometric and physical constraints for the DISCOS catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscosFilter {
    pub cospar_id: Option<Vec<String>>,
    pub norad_id: Option<IdSelector>,
    pub object_class: Option<Vec<String>>,
    pub payload: Option<bool>,
    pub decayed: Option<bool>,
    pub decay_date: Option<DateRange>,
    pub mass: Option<NumericRange>,
    pub shape: Option<TextMatch>,
    pub length: Option<NumericRange>,
    pub height: Option<NumericRange>,
    pub depth: Option<NumericRange>,
    pub rcs_min: Option<NumericRange>,
    pub rcs_max: Option<NumericRange>,
    pub rcs_avg: Option<NumericRange>,
}

impl DiscosFilter {
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let combined = ObjectsFilter::parse_pairs(pairs, DISCOS_CONSTRAINTS)?;
        Ok(combined.discos_filter(combined.norad_id.clone()))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Replaces a file-backed NORAD_ID selector with the ids it names.
    pub async fn load_id_files(mut self) -> Result<Self, ValidationError> {
        self.norad_id = load_selector(self.norad_id).await?;
        Ok(self)
    }
}

/// Orbital constraints for the CelesTrak SATCAT snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CelestrakFilter {
    pub cospar_id: Option<Vec<String>>,
    pub norad_id: Option<IdSelector>,
    pub payload: Option<bool>,
    pub decayed: Option<bool>,
    pub decay_date: Option<DateRange>,
    pub period: Option<NumericRange>,
    pub inclination: Option<NumericRange>,
    pub apogee: Option<NumericRange>,
    pub perigee: Option<NumericRange>,
    pub mean_alt: Option<NumericRange>,
    pub ecc: Option<NumericRange>,
    pub owner: Option<Vec<String>>,
    pub tle_status: Option<bool>,
}

impl CelestrakFilter {
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(ObjectsFilter::parse_pairs(pairs, CELESTRAK_CONSTRAINTS)?.celestrak_filter())
    }

    pub async fn load_id_files(mut self) -> Result<Self, ValidationError> {
        self.norad_id = load_selector(self.norad_id).await?;
        Ok(self)
    }
}

/// Union of the DISCOS and CelesTrak constraints for merged queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectsFilter {
    pub cospar_id: Option<Vec<String>>,
    pub norad_id: Option<IdSelector>,
    pub payload: Option<bool>,
    pub object_class: Option<Vec<String>>,
    pub decayed: Option<bool>,
    pub decay_date: Option<DateRange>,
    pub period: Option<NumericRange>,
    pub inclination: Option<NumericRange>,
    pub apogee: Option<NumericRange>,
    pub perigee: Option<NumericRange>,
    pub mean_alt: Option<NumericRange>,
    pub ecc: Option<NumericRange>,
    pub tle_status: Option<bool>,
    pub mass: Option<NumericRange>,
    pub shape: Option<TextMatch>,
    pub length: Option<NumericRange>,
    pub height: Option<NumericRange>,
    pub depth: Option<NumericRange>,
    pub rcs_min: Option<NumericRange>,
    pub rcs_max: Option<NumericRange>,
    pub rcs_avg: Option<NumericRange>,
    pub owner: Option<Vec<String>>,
}

impl ObjectsFilter {
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::parse_pairs(pairs, OBJECTS_CONSTRAINTS)
    }

    pub async fn load_id_files(mut self) -> Result<Self, ValidationError> {
        self.norad_id = load_selector(self.norad_id).await?;
        Ok(self)
    }

    fn parse_pairs<I, K, V>(pairs: I, accepted: &[ConstraintName]) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (name, value) in pairs {
            let name = ConstraintName::lookup(name.as_ref(), accepted)?;
            filter.apply(name, value.as_ref())?;
        }
        Ok(filter)
    }

    /// Sets one constraint from its textual value.
    pub fn apply(&mut self, name: ConstraintName, raw: &str) -> Result<(), ValidationError> {
        match name {
            ConstraintName::CosparId => self.cospar_id = Some(parse_list(name, raw)?),
            ConstraintName::NoradId => {
                let selector = IdSelector::parse(raw)
                    .map_err(|_| shape_error(name, NORAD_ID_SHAPE, raw))?;
                self.norad_id = Some(selector);
            }
            ConstraintName::ObjectClass => self.object_class = Some(parse_list(name, raw)?),
            ConstraintName::Payload => self.payload = Some(parse_bool(name, raw)?),
            ConstraintName::Decayed => self.decayed = Some(parse_bool(name, raw)?),
            ConstraintName::DecayDate => self.decay_date = Some(parse_date_range(name, raw)?),
            ConstraintName::Period => self.period = Some(parse_numeric_range(name, raw)?),
            ConstraintName::Inclination => {
                self.inclination = Some(parse_numeric_range(name, raw)?)
            }
            ConstraintName::Apogee => self.apogee = Some(parse_numeric_range(name, raw)?),
            ConstraintName::Perigee => self.perigee = Some(parse_numeric_range(name, raw)?),
            ConstraintName::MeanAlt => self.mean_alt = Some(parse_numeric_range(name, raw)?),
            ConstraintName::Ecc => self.ecc = Some(parse_numeric_range(name, raw)?),
            ConstraintName::Owner => self.owner = Some(parse_list(name, raw)?),
            ConstraintName::TleStatus => self.tle_status = Some(parse_bool(name, raw)?),
            ConstraintName::Mass => self.mass = Some(parse_numeric_range(name, raw)?),
            ConstraintName::Shape => {
                let shape = TextMatch::from_tokens(parse_list(name, raw)?);
                if shape.terms().is_empty() {
                    return Err(shape_error(name, "at least one shape before '+'", raw));
                }
                self.shape = Some(shape);
            }
            ConstraintName::Length => self.length = Some(parse_numeric_range(name, raw)?),
            ConstraintName::Height => self.height = Some(parse_numeric_range(name, raw)?),
            ConstraintName::Depth => self.depth = Some(parse_numeric_range(name, raw)?),
            ConstraintName::RcsMin => self.rcs_min = Some(parse_numeric_range(name, raw)?),
            ConstraintName::RcsMax => self.rcs_max = Some(parse_numeric_range(name, raw)?),
            ConstraintName::RcsAvg => self.rcs_avg = Some(parse_numeric_range(name, raw)?),
        }
        Ok(())
    }

    pub fn celestrak_filter(&self) -> CelestrakFilter {
        CelestrakFilter {
            cospar_id: self.cospar_id.clone(),
            norad_id: self.norad_id.clone(),
            payload: self.payload,
            decayed: self.decayed,
            decay_date: self.decay_date,
            period: self.period,
            inclination: self.inclination,
            apogee: self.apogee,
            perigee: self.perigee,
            mean_alt: self.mean_alt,
            ecc: self.ecc,
            owner: self.owner.clone(),
            tle_status: self.tle_status,
        }
    }

    /// Projects onto the DISCOS constraints with `norad_id` substituted.
    pub fn discos_filter(&self, norad_id: Option<IdSelector>) -> DiscosFilter {
        DiscosFilter {
            cospar_id: self.cospar_id.clone(),
            norad_id,
            object_class: self.object_class.clone(),
            payload: self.payload,
            decayed: self.decayed,
            decay_date: self.decay_date,
            mass: self.mass,
            shape: self.shape.clone(),
            length: self.length,
            height: self.height,
            depth: self.depth,
            rcs_min: self.rcs_min,
            rcs_max: self.rcs_max,
            rcs_avg: self.rcs_avg,
        }
    }
}

async fn load_selector(
    selector: Option<IdSelector>,
) -> Result<Option<IdSelector>, ValidationError> {
    match selector {
        Some(selector) => selector.load().await.map(Some),
        None => Ok(None),
    }
}

const NORAD_ID_SHAPE: &str = "a catalog number, a comma-separated list of numbers, or a file name";

fn shape_error(name: ConstraintName, expected: &'static str, raw: &str) -> ValidationError {
    ValidationError::ConstraintShape {
        name: name.as_str().to_owned(),
        expected,
        value: raw.to_owned(),
    }
}

fn parse_bool(name: ConstraintName, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(shape_error(name, "true or false", raw)),
    }
}

fn parse_list(name: ConstraintName, raw: &str) -> Result<Vec<String>, ValidationError> {
    let values: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect();
    if values.is_empty() {
        return Err(shape_error(name, "one or more comma-separated values", raw));
    }
    Ok(values)
}

fn split_range(name: ConstraintName, raw: &str) -> Result<(&str, &str), ValidationError> {
    let bounds: Vec<&str> = raw.split(',').map(str::trim).collect();
    match bounds.as_slice() {
        [lo, hi] if !lo.is_empty() && !hi.is_empty() => Ok((lo, hi)),
        _ => Err(shape_error(name, "a range of exactly two values 'lo,hi'", raw)),
    }
}

fn parse_numeric_range(name: ConstraintName, raw: &str) -> Result<NumericRange, ValidationError> {
    let (lo, hi) = split_range(name, raw)?;
    let parse = |bound: &str| {
        bound
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| shape_error(name, "numeric range bounds", raw))
    };
    Ok(Range::new(parse(lo)?, parse(hi)?))
}

fn parse_date_range(name: ConstraintName, raw: &str) -> Result<DateRange, ValidationError> {
    let (lo, hi) = split_range(name, raw)?;
    let parse = |bound: &str| {
        parse_date(bound)
            .map_err(|_| shape_error(name, "a date range 'YYYY-MM-DD,YYYY-MM-DD'", raw))
    };
    Ok(Range::new(parse(lo)?, parse(hi)?))
}
