use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde_json::{json, Value};
use time::Date;

use super::date::{format_date, parse_date};

/// One space object's attributes, as the union of every provider's columns.
///
/// Absent or unparseable cells are `None`; which fields are meaningful for a
/// given table is decided by that table's column schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRecord {
    pub object_name: Option<String>,
    pub cospar_id: Option<String>,
    pub norad_id: Option<u32>,
    pub object_type: Option<String>,
    pub object_class: Option<String>,
    pub ops_status_code: Option<String>,
    pub decay_date: Option<Date>,
    pub period: Option<f64>,
    pub inclination: Option<f64>,
    pub apogee: Option<f64>,
    pub perigee: Option<f64>,
    pub mean_alt: Option<f64>,
    pub ecc: Option<f64>,
    pub launch_date: Option<Date>,
    pub launch_site: Option<String>,
    pub rcs: Option<f64>,
    pub owner: Option<String>,
    pub data_status_code: Option<String>,
    pub orbit_center: Option<String>,
    pub orbit_type: Option<String>,
    pub mass: Option<f64>,
    pub shape: Option<String>,
    pub height: Option<f64>,
    pub length: Option<f64>,
    pub depth: Option<f64>,
    pub rcs_min: Option<f64>,
    pub rcs_max: Option<f64>,
    pub rcs_avg: Option<f64>,
    pub std_mag: Option<f64>,
}

/// Output column with its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ObjectName,
    CosparId,
    NoradId,
    ObjectType,
    ObjectClass,
    OpsStatusCode,
    DecayDate,
    Period,
    Inclination,
    Apogee,
    Perigee,
    MeanAlt,
    Ecc,
    LaunchDate,
    LaunchSite,
    Rcs,
    Owner,
    DataStatusCode,
    OrbitCenter,
    OrbitType,
    Mass,
    Shape,
    Height,
    Length,
    Depth,
    RcsMin,
    RcsMax,
    RcsAvg,
    StdMag,
}

impl Column {
    pub const ALL: [Self; 29] = [
        Self::ObjectName,
        Self::CosparId,
        Self::NoradId,
        Self::ObjectType,
        Self::ObjectClass,
        Self::OpsStatusCode,
        Self::DecayDate,
        Self::Period,
        Self::Inclination,
        Self::Apogee,
        Self::Perigee,
        Self::MeanAlt,
        Self::Ecc,
        Self::LaunchDate,
        Self::LaunchSite,
        Self::Rcs,
        Self::Owner,
        Self::DataStatusCode,
        Self::OrbitCenter,
        Self::OrbitType,
        Self::Mass,
        Self::Shape,
        Self::Height,
        Self::Length,
        Self::Depth,
        Self::RcsMin,
        Self::RcsMax,
        Self::RcsAvg,
        Self::StdMag,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ObjectName => "OBJECT_NAME",
            Self::CosparId => "COSPAR_ID",
            Self::NoradId => "NORAD_ID",
            Self::ObjectType => "OBJECT_TYPE",
            Self::ObjectClass => "OBJECT_CLASS",
            Self::OpsStatusCode => "OPS_STATUS_CODE",
            Self::DecayDate => "DECAY_DATE",
            Self::Period => "PERIOD",
            Self::Inclination => "INCLINATION",
            Self::Apogee => "APOGEE",
            Self::Perigee => "PERIGEE",
            Self::MeanAlt => "MEAN_ALT",
            Self::Ecc => "ECC",
            Self::LaunchDate => "LAUNCH_DATE",
            Self::LaunchSite => "LAUNCH_SITE",
            Self::Rcs => "RCS",
            Self::Owner => "OWNER",
            Self::DataStatusCode => "DATA_STATUS_CODE",
            Self::OrbitCenter => "ORBIT_CENTER",
            Self::OrbitType => "ORBIT_TYPE",
            Self::Mass => "MASS",
            Self::Shape => "SHAPE",
            Self::Height => "HEIGHT",
            Self::Length => "LENGTH",
            Self::Depth => "DEPTH",
            Self::RcsMin => "RCSMin",
            Self::RcsMax => "RCSMax",
            Self::RcsAvg => "RCSAvg",
            Self::StdMag => "StdMag",
        }
    }

    /// Exact, case-sensitive lookup by canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.as_str() == name)
    }

    pub fn cell(self, record: &CatalogRecord) -> Cell<'_> {
        match self {
            Self::ObjectName => Cell::text(&record.object_name),
            Self::CosparId => Cell::text(&record.cospar_id),
            Self::NoradId => record.norad_id.map_or(Cell::Empty, Cell::Id),
            Self::ObjectType => Cell::text(&record.object_type),
            Self::ObjectClass => Cell::text(&record.object_class),
            Self::OpsStatusCode => Cell::text(&record.ops_status_code),
            Self::DecayDate => record.decay_date.map_or(Cell::Empty, Cell::Date),
            Self::Period => Cell::number(record.period),
            Self::Inclination => Cell::number(record.inclination),
            Self::Apogee => Cell::number(record.apogee),
            Self::Perigee => Cell::number(record.perigee),
            Self::MeanAlt => Cell::number(record.mean_alt),
            Self::Ecc => Cell::number(record.ecc),
            Self::LaunchDate => record.launch_date.map_or(Cell::Empty, Cell::Date),
            Self::LaunchSite => Cell::text(&record.launch_site),
            Self::Rcs => Cell::number(record.rcs),
            Self::Owner => Cell::text(&record.owner),
            Self::DataStatusCode => Cell::text(&record.data_status_code),
            Self::OrbitCenter => Cell::text(&record.orbit_center),
            Self::OrbitType => Cell::text(&record.orbit_type),
            Self::Mass => Cell::number(record.mass),
            Self::Shape => Cell::text(&record.shape),
            Self::Height => Cell::number(record.height),
            Self::Length => Cell::number(record.length),
            Self::Depth => Cell::number(record.depth),
            Self::RcsMin => Cell::number(record.rcs_min),
            Self::RcsMax => Cell::number(record.rcs_max),
            Self::RcsAvg => Cell::number(record.rcs_avg),
            Self::StdMag => Cell::number(record.std_mag),
        }
    }

    /// Stores a raw textual cell into `record`. Empty or unparseable input
    /// clears the field; `Err` only for an unparseable catalog number.
    pub fn assign(self, record: &mut CatalogRecord, raw: &str) -> Result<(), String> {
        let raw = raw.trim();
        let text = (!raw.is_empty()).then(|| raw.to_owned());
        let number = raw.parse::<f64>().ok().filter(|value| value.is_finite());
        let date = parse_date(raw).ok();

        match self {
            Self::ObjectName => record.object_name = text,
            Self::CosparId => record.cospar_id = text,
            Self::NoradId => {
                record.norad_id = if raw.is_empty() {
                    None
                } else {
                    Some(raw.parse::<u32>().map_err(|_| raw.to_owned())?)
                }
            }
            Self::ObjectType => record.object_type = text,
            Self::ObjectClass => record.object_class = text,
            Self::OpsStatusCode => record.ops_status_code = text,
            Self::DecayDate => record.decay_date = date,
            Self::Period => record.period = number,
            Self::Inclination => record.inclination = number,
            Self::Apogee => record.apogee = number,
            Self::Perigee => record.perigee = number,
            Self::MeanAlt => record.mean_alt = number,
            Self::Ecc => record.ecc = number,
            Self::LaunchDate => record.launch_date = date,
            Self::LaunchSite => record.launch_site = text,
            Self::Rcs => record.rcs = number,
            Self::Owner => record.owner = text,
            Self::DataStatusCode => record.data_status_code = text,
            Self::OrbitCenter => record.orbit_center = text,
            Self::OrbitType => record.orbit_type = text,
            Self::Mass => record.mass = number,
            Self::Shape => record.shape = text,
            Self::Height => record.height = number,
            Self::Length => record.length = number,
            Self::Depth => record.depth = number,
            Self::RcsMin => record.rcs_min = number,
            Self::RcsMax => record.rcs_max = number,
            Self::RcsAvg => record.rcs_avg = number,
            Self::StdMag => record.std_mag = number,
        }

        Ok(())
    }

    /// Clears this column's field in `record`.
    pub fn clear(self, record: &mut CatalogRecord) {
        // Infallible for the empty string.
        let _ = self.assign(record, "");
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of a single record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Empty,
    Text(&'a str),
    Id(u32),
    Number(f64),
    Date(Date),
}

impl<'a> Cell<'a> {
    fn text(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(Self::Empty, Self::Text)
    }

    fn number(value: Option<f64>) -> Self {
        value.map_or(Self::Empty, Self::Number)
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Ordering between two present cells of the same column.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Id(a), Self::Id(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Text(value) => json!(value),
            Self::Id(value) => json!(value),
            Self::Number(value) => json!(value),
            Self::Date(value) => json!(format_date(*value)),
        }
    }
}

impl Display for Cell<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(value) => f.write_str(value),
            Self::Id(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Date(value) => f.write_str(&format_date(*value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip_through_lookup() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.as_str()), Some(column));
        }
        assert_eq!(Column::from_name("rcsavg"), None);
    }

    #[test]
    fn assign_parses_by_column_kind() {
        let mut record = CatalogRecord::default();
        Column::NoradId.assign(&mut record, "25544").unwrap();
        Column::Apogee.assign(&mut record, " 421.0 ").unwrap();
        Column::DecayDate.assign(&mut record, "2020-05-30").unwrap();
        Column::Owner.assign(&mut record, "").unwrap();

        assert_eq!(record.norad_id, Some(25544));
        assert_eq!(record.apogee, Some(421.0));
        assert_eq!(Column::DecayDate.cell(&record).to_string(), "2020-05-30");
        assert_eq!(record.owner, None);
    }

    #[test]
    fn assign_rejects_non_numeric_catalog_number() {
        let mut record = CatalogRecord::default();
        assert!(Column::NoradId.assign(&mut record, "ISS").is_err());
    }

    #[test]
    fn unparseable_number_becomes_empty() {
        let mut record = CatalogRecord::default();
        Column::Period.assign(&mut record, "n/a").unwrap();
        assert!(Column::Period.cell(&record).is_empty());
    }
}
