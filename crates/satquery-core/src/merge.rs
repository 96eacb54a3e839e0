use std::collections::{HashMap, HashSet};

use crate::domain::{CatalogRecord, Column};
use crate::qsmag::MagnitudeEntry;
use crate::table::{CatalogTable, Provenance};
use crate::QueryError;

/// Schema of a merged SATCAT + DISCOS + magnitude table.
pub const OBJECTS_COLUMNS: &[Column] = &[
    Column::ObjectName,
    Column::CosparId,
    Column::NoradId,
    Column::ObjectClass,
    Column::OpsStatusCode,
    Column::DecayDate,
    Column::Period,
    Column::Inclination,
    Column::Apogee,
    Column::Perigee,
    Column::MeanAlt,
    Column::Ecc,
    Column::DataStatusCode,
    Column::OrbitCenter,
    Column::OrbitType,
    Column::Mass,
    Column::Shape,
    Column::Length,
    Column::Height,
    Column::Depth,
    Column::RcsMin,
    Column::RcsMax,
    Column::RcsAvg,
    Column::StdMag,
    Column::LaunchDate,
    Column::LaunchSite,
    Column::Owner,
];

type JoinKey = (Option<String>, Option<u32>);

fn join_key(row: &CatalogRecord) -> JoinKey {
    (row.cospar_id.clone(), row.norad_id)
}

fn describe(key: &JoinKey) -> String {
    let cospar = key.0.as_deref().unwrap_or("");
    match key.1 {
        Some(norad) => format!("(COSPAR_ID={cospar}, NORAD_ID={norad})"),
        None => format!("(COSPAR_ID={cospar}, NORAD_ID=)"),
    }
}

/// Joins SATCAT rows with DISCOS rows one-to-one on `(COSPAR_ID, NORAD_ID)`,
/// then attaches standard magnitudes by NORAD id.
///
/// Rows appear in SATCAT order. Names, object classes and geometry come from
/// DISCOS; orbital and launch fields from SATCAT. A duplicate key in any input
/// fails the merge.
pub fn merge_objects(
    celestrak: CatalogTable,
    discos: CatalogTable,
    magnitudes: &[MagnitudeEntry],
    drop_data_status: bool,
) -> Result<CatalogTable, QueryError> {
    let mut seen = HashSet::new();
    for row in celestrak.rows() {
        let key = join_key(row);
        if !seen.insert(key.clone()) {
            return Err(QueryError::JoinCardinality {
                side: "celestrak",
                key: describe(&key),
            });
        }
    }

    let mut discos_rows: HashMap<JoinKey, CatalogRecord> = HashMap::new();
    for row in discos.into_rows() {
        if row.norad_id.is_none() {
            continue;
        }
        let key = join_key(&row);
        if discos_rows.contains_key(&key) {
            return Err(QueryError::JoinCardinality {
                side: "discos",
                key: describe(&key),
            });
        }
        discos_rows.insert(key, row);
    }

    let mut std_mags: HashMap<u32, f64> = HashMap::with_capacity(magnitudes.len());
    for entry in magnitudes {
        if std_mags.insert(entry.norad_id, entry.std_mag).is_some() {
            return Err(QueryError::JoinCardinality {
                side: "magnitude",
                key: format!("(NORAD_ID={})", entry.norad_id),
            });
        }
    }

    let mut merged_ids = HashSet::new();
    let mut rows = Vec::new();
    for row in celestrak.into_rows() {
        let Some(physical) = discos_rows.remove(&join_key(&row)) else {
            continue;
        };
        if let Some(norad_id) = row.norad_id {
            if !merged_ids.insert(norad_id) {
                return Err(QueryError::JoinCardinality {
                    side: "objects",
                    key: format!("(NORAD_ID={norad_id})"),
                });
            }
        }
        rows.push(combine(row, physical, &std_mags));
    }

    tracing::info!(merged = rows.len(), "merged SATCAT and DISCOS rows");

    let mut table = CatalogTable::new(Provenance::Objects, OBJECTS_COLUMNS.to_vec(), rows);
    if drop_data_status {
        table.drop_column(Column::DataStatusCode);
    }
    Ok(table)
}

fn combine(
    orbital: CatalogRecord,
    physical: CatalogRecord,
    std_mags: &HashMap<u32, f64>,
) -> CatalogRecord {
    let std_mag = orbital
        .norad_id
        .and_then(|norad_id| std_mags.get(&norad_id).copied());
    CatalogRecord {
        object_name: physical.object_name,
        object_class: physical.object_class,
        mass: physical.mass,
        shape: physical.shape,
        height: physical.height,
        length: physical.length,
        depth: physical.depth,
        rcs_min: physical.rcs_min,
        rcs_max: physical.rcs_max,
        rcs_avg: physical.rcs_avg,
        // Superseded by the DISCOS cross sections.
        rcs: None,
        object_type: None,
        std_mag,
        ..orbital
    }
}
