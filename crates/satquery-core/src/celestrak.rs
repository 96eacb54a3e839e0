//! CelesTrak SATCAT snapshot: loading, derived orbit columns and mask filtering.

use std::collections::HashSet;
use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncRead;

use crate::domain::{CatalogRecord, Column, Range};
use crate::filter::CelestrakFilter;
use crate::provider_policy::ProviderId;
use crate::table::{CatalogTable, Provenance};
use crate::{QueryError, ValidationError};

pub const DEFAULT_SATCAT_URL: &str = "https://celestrak.com/pub/satcat.csv";

/// Volumetric mean radius of the Earth in km.
pub const EARTH_VOLUMETRIC_RADIUS_KM: f64 = 6371.0008;

/// Schema of a SATCAT-only result table.
pub const CELESTRAK_COLUMNS: &[Column] = &[
    Column::ObjectName,
    Column::CosparId,
    Column::NoradId,
    Column::ObjectType,
    Column::OpsStatusCode,
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
    Column::DataStatusCode,
    Column::OrbitCenter,
    Column::OrbitType,
];

const COSPAR_HEADER: &str = "OBJECT_ID";
const NORAD_HEADER: &str = "NORAD_CAT_ID";
const PAYLOAD_TYPE: &str = "PAY";
const DECAYED_STATUS: &str = "D";

/// Maps a SATCAT CSV header to the column it fills, if recognised.
fn snapshot_column(header: &str) -> Option<Column> {
    match header {
        COSPAR_HEADER => Some(Column::CosparId),
        NORAD_HEADER => Some(Column::NoradId),
        // Derived below, never read from the file.
        "MEAN_ALT" | "ECC" => None,
        other => Column::from_name(other).filter(|column| CELESTRAK_COLUMNS.contains(column)),
    }
}

/// Loaded snapshot rows with their derived columns filled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SatcatSnapshot {
    rows: Vec<CatalogRecord>,
}

impl SatcatSnapshot {
    pub fn new(mut rows: Vec<CatalogRecord>) -> Self {
        for row in &mut rows {
            derive_orbit(row);
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[CatalogRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Applies every constraint in `filter` and returns the retained rows.
    pub fn query(&self, filter: &CelestrakFilter) -> Result<CatalogTable, ValidationError> {
        let mask = combined_mask(&self.rows, filter)?;
        let rows: Vec<CatalogRecord> = self
            .rows
            .iter()
            .zip(mask)
            .filter_map(|(row, keep)| keep.then(|| row.clone()))
            .collect();
        tracing::info!(
            snapshot_rows = self.rows.len(),
            retained = rows.len(),
            "filtered SATCAT snapshot"
        );

        let mut table = CatalogTable::new(Provenance::Celestrak, CELESTRAK_COLUMNS.to_vec(), rows);
        if filter.tle_status == Some(true) {
            table.drop_column(Column::DataStatusCode);
        }
        Ok(table)
    }
}

/// Mean altitude and eccentricity from apogee and perigee altitudes.
fn derive_orbit(row: &mut CatalogRecord) {
    let (mean_alt, ecc) = match (row.apogee, row.perigee) {
        (Some(apogee), Some(perigee)) => {
            let mean_alt = (apogee + perigee) / 2.0;
            let ecc = (apogee - perigee) / (mean_alt + EARTH_VOLUMETRIC_RADIUS_KM) / 2.0;
            (Some(mean_alt), Some(ecc))
        }
        _ => (None, None),
    };
    row.mean_alt = mean_alt;
    row.ecc = ecc;
}

pub async fn load_snapshot(path: &Path) -> Result<SatcatSnapshot, QueryError> {
    let file = tokio::fs::File::open(path).await?;
    let snapshot = read_snapshot(file).await?;
    tracing::info!(
        provider = %ProviderId::Celestrak,
        path = %path.display(),
        rows = snapshot.len(),
        "loaded SATCAT snapshot"
    );
    Ok(snapshot)
}

pub async fn read_snapshot<R>(reader: R) -> Result<SatcatSnapshot, QueryError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut reader = csv_async::AsyncReader::from_reader(reader);
    let headers = reader.headers().await?.clone();
    let layout: Vec<Option<Column>> = headers
        .iter()
        .map(|header| snapshot_column(header.trim()))
        .collect();

    for (header, column) in [(COSPAR_HEADER, Column::CosparId), (NORAD_HEADER, Column::NoradId)] {
        if !layout.contains(&Some(column)) {
            return Err(QueryError::MissingColumn(header));
        }
    }

    let mut rows = Vec::new();
    let mut records = reader.records();
    while let Some(record) = records.next().await {
        let record = record?;
        // Header is line 1.
        let line = record.position().map_or(0, |position| position.line());
        match snapshot_row(&layout, &record) {
            Ok(row) => rows.push(row),
            Err(value) => {
                tracing::warn!(
                    line,
                    value = %value,
                    "skipping SATCAT row with an invalid catalog number"
                );
            }
        }
    }

    Ok(SatcatSnapshot::new(rows))
}

fn snapshot_row(
    layout: &[Option<Column>],
    record: &csv_async::StringRecord,
) -> Result<CatalogRecord, String> {
    let mut row = CatalogRecord::default();
    for (column, raw) in layout.iter().zip(record.iter()) {
        if let Some(column) = column {
            column.assign(&mut row, raw)?;
        }
    }
    Ok(row)
}

fn combined_mask(
    rows: &[CatalogRecord],
    filter: &CelestrakFilter,
) -> Result<Vec<bool>, ValidationError> {
    let norad_ids = filter
        .norad_id
        .as_ref()
        .map(|selector| {
            selector
                .ids()
                .map(|ids| ids.iter().copied().collect::<HashSet<u32>>())
        })
        .transpose()?;
    let cospar_ids = filter.cospar_id.as_deref().map(string_set);
    let owners = filter.owner.as_deref().map(string_set);

    let masks = [
        membership_mask(rows, cospar_ids.as_ref(), |row| row.cospar_id.as_ref()),
        membership_mask(rows, norad_ids.as_ref(), |row| row.norad_id.as_ref()),
        flag_mask(rows, filter.payload, |row| {
            row.object_type.as_deref() == Some(PAYLOAD_TYPE)
        }),
        flag_mask(rows, filter.decayed, |row| {
            row.ops_status_code.as_deref() == Some(DECAYED_STATUS)
        }),
        range_mask(rows, filter.decay_date, |row| row.decay_date),
        range_mask(rows, filter.period, |row| row.period),
        range_mask(rows, filter.inclination, |row| row.inclination),
        range_mask(rows, filter.apogee, |row| row.apogee),
        range_mask(rows, filter.perigee, |row| row.perigee),
        range_mask(rows, filter.mean_alt, |row| row.mean_alt),
        range_mask(rows, filter.ecc, |row| row.ecc),
        membership_mask(rows, owners.as_ref(), |row| row.owner.as_ref()),
        flag_mask(rows, filter.tle_status, |row| row.data_status_code.is_none()),
    ];

    let mut combined = vec![true; rows.len()];
    for mask in masks {
        for (keep, passes) in combined.iter_mut().zip(mask) {
            *keep &= passes;
        }
    }
    Ok(combined)
}

fn string_set(values: &[String]) -> HashSet<String> {
    values.iter().cloned().collect()
}

/// `None` keeps every row; otherwise rows whose value is in `allowed`.
fn membership_mask<T, F>(
    rows: &[CatalogRecord],
    allowed: Option<&HashSet<T>>,
    value: F,
) -> Vec<bool>
where
    T: Eq + std::hash::Hash,
    F: Fn(&CatalogRecord) -> Option<&T>,
{
    match allowed {
        None => vec![true; rows.len()],
        Some(allowed) => rows
            .iter()
            .map(|row| value(row).is_some_and(|value| allowed.contains(value)))
            .collect(),
    }
}

/// `None` keeps every row, `Some(true)` rows where `flag` holds, `Some(false)` the rest.
fn flag_mask<F>(rows: &[CatalogRecord], wanted: Option<bool>, flag: F) -> Vec<bool>
where
    F: Fn(&CatalogRecord) -> bool,
{
    match wanted {
        None => vec![true; rows.len()],
        Some(wanted) => rows.iter().map(|row| flag(row) == wanted).collect(),
    }
}

/// Strict `lo < value < hi`; a missing value never passes.
fn range_mask<T, F>(rows: &[CatalogRecord], bounds: Option<Range<T>>, value: F) -> Vec<bool>
where
    T: PartialOrd,
    F: Fn(&CatalogRecord) -> Option<T>,
{
    match bounds {
        None => vec![true; rows.len()],
        Some(bounds) => rows
            .iter()
            .map(|row| value(row).is_some_and(|value| bounds.contains_exclusive(&value)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IdSelector;

    const SNAPSHOT: &str = "\
OBJECT_NAME,OBJECT_ID,NORAD_CAT_ID,OBJECT_TYPE,OPS_STATUS_CODE,OWNER,LAUNCH_DATE,LAUNCH_SITE,DECAY_DATE,PERIOD,INCLINATION,APOGEE,PERIGEE,RCS,DATA_STATUS_CODE,ORBIT_CENTER,ORBIT_TYPE
ISS (ZARYA),1998-067A,25544,PAY,+,ISS,1998-11-20,TYMSC,,92.9,51.6,421,417,399.05,,EA,ORB
SL-8 R/B,1970-025C,4370,R/B,D,CIS,1970-04-28,PKMTR,2019-03-01,95.1,74,500,400,1.1,,EA,IMP
FENGYUN 1C DEB,1999-025AAA,29700,DEB,,PRC,1999-05-10,TSC,,100.2,98.7,900,850,0.05,NCE,EA,ORB
";

    async fn snapshot() -> SatcatSnapshot {
        read_snapshot(SNAPSHOT.as_bytes()).await.expect("snapshot parses")
    }

    #[tokio::test]
    async fn derives_mean_altitude_and_eccentricity() {
        let snapshot = snapshot().await;
        let iss = &snapshot.rows()[0];
        assert_eq!(iss.mean_alt, Some(419.0));
        let expected = 4.0 / (419.0 + EARTH_VOLUMETRIC_RADIUS_KM) / 2.0;
        assert!((iss.ecc.unwrap() - expected).abs() < 1e-12);
        assert_eq!(iss.cospar_id.as_deref(), Some("1998-067A"));
    }

    #[tokio::test]
    async fn absent_constraints_keep_every_row() {
        let snapshot = snapshot().await;
        let table = snapshot.query(&CelestrakFilter::default()).unwrap();
        assert_eq!(table.len(), snapshot.len());
        assert_eq!(table.columns(), CELESTRAK_COLUMNS);
    }

    #[tokio::test]
    async fn ranges_use_strict_bounds() {
        let snapshot = snapshot().await;
        let filter = CelestrakFilter {
            apogee: Some(Range::new(421.0, 900.0)),
            ..CelestrakFilter::default()
        };
        // 421 and 900 sit on the bounds and are excluded.
        assert_eq!(snapshot.query(&filter).unwrap().norad_ids(), vec![4370]);
    }

    #[tokio::test]
    async fn not_decayed_excludes_the_decay_sentinel() {
        let snapshot = snapshot().await;
        let filter = CelestrakFilter {
            decayed: Some(false),
            ..CelestrakFilter::default()
        };
        assert_eq!(snapshot.query(&filter).unwrap().norad_ids(), vec![25544, 29700]);
    }

    #[tokio::test]
    async fn valid_tle_drops_the_status_column() {
        let snapshot = snapshot().await;
        let filter = CelestrakFilter {
            tle_status: Some(true),
            ..CelestrakFilter::default()
        };
        let table = snapshot.query(&filter).unwrap();
        assert_eq!(table.norad_ids(), vec![25544, 4370]);
        assert!(!table.has_column(Column::DataStatusCode));
    }

    #[tokio::test]
    async fn membership_masks_combine_with_and() {
        let snapshot = snapshot().await;
        let filter = CelestrakFilter {
            norad_id: Some(IdSelector::Literal(vec![25544, 29700])),
            owner: Some(vec![String::from("PRC")]),
            payload: Some(false),
            ..CelestrakFilter::default()
        };
        assert_eq!(snapshot.query(&filter).unwrap().norad_ids(), vec![29700]);
    }

    #[tokio::test]
    async fn row_with_a_malformed_catalog_number_is_skipped() {
        let text = "\
OBJECT_NAME,OBJECT_ID,NORAD_CAT_ID,OBJECT_TYPE
ISS (ZARYA),1998-067A,25544,PAY
BROKEN,1999-001A,12A45,DEB
SL-8 R/B,1970-025C,4370,R/B
";

        let snapshot = read_snapshot(text.as_bytes()).await.expect("snapshot parses");

        let ids: Vec<_> = snapshot.rows().iter().filter_map(|row| row.norad_id).collect();
        assert_eq!(ids, vec![25544, 4370]);
    }

    #[tokio::test]
    async fn missing_identifier_column_is_a_schema_error() {
        let error = read_snapshot("OBJECT_NAME,OBJECT_ID\nISS,1998-067A\n".as_bytes())
            .await
            .expect_err("must fail");
        assert!(matches!(error, QueryError::MissingColumn("NORAD_CAT_ID")));
    }
}
