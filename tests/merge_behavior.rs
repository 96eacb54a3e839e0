//! Behavior-driven tests for merged SATCAT + DISCOS + magnitude queries.
//!
//! These tests verify HOW the one-to-one join behaves end to end through
//! `Catalog::objects_query` and when the merge is called directly.

use satquery_core::{
    merge_objects, CatalogRecord, CatalogTable, Column, MagnitudeEntry, ObjectsFilter,
    Provenance, QueryError, CELESTRAK_COLUMNS, DISCOS_COLUMNS,
};
use serde_json::json;

use satquery_tests::{
    catalog_in, catalog_with, discos_object, discos_page, qsmag_file, qsmag_line,
    ScriptedHttpClient,
};

fn write_qsmag(dir: &std::path::Path) {
    let text = qsmag_file(&[
        qsmag_line(25544, "ISS (ZARYA)", "-1.8"),
        qsmag_line(4370, "SL-8 R/B", "4.0"),
        qsmag_line(29700, "FENGYUN 1C DEB", ""),
    ]);
    std::fs::write(dir.join("qs.mag"), text).expect("qs.mag fixture");
}

fn payload_pages() -> Vec<Result<satquery_core::HttpResponse, satquery_core::HttpError>> {
    vec![discos_page(
        1,
        1,
        vec![
            discos_object(20580, "1990-037B", "HST"),
            discos_object(25544, "1998-067A", "ISS"),
        ],
    )]
}

// =============================================================================
// End-to-end merge
// =============================================================================

#[tokio::test]
async fn when_objects_are_merged_each_source_contributes_its_fields() {
    // Given: SATCAT, a DISCOS page with both payloads, and a magnitude file
    let dir = tempfile::tempdir().expect("temp dir");
    write_qsmag(dir.path());
    let http = ScriptedHttpClient::new(payload_pages());
    let catalog = catalog_in(dir.path(), http.clone());
    let filter = ObjectsFilter::from_pairs([("PAYLOAD", "true")]).expect("valid");

    // When: Running the merged query
    let table = catalog.objects_query(&filter, None).await.expect("merge succeeds");

    // Then: Rows are sorted by catalog number and carry merged fields
    assert_eq!(table.provenance(), Provenance::Objects);
    assert_eq!(table.norad_ids(), vec![20580, 25544]);

    let hubble = &table.rows()[0];
    assert_eq!(hubble.object_name.as_deref(), Some("HST"));
    assert_eq!(hubble.apogee, Some(540.0));
    assert_eq!(hubble.rcs_avg, Some(4.5));
    assert_eq!(hubble.std_mag, None, "no magnitude entry keeps StdMag empty");

    let iss = &table.rows()[1];
    assert_eq!(iss.std_mag, Some(-1.8));
    assert_eq!(iss.rcs, None);
    assert!(!table.has_column(Column::Rcs));
    assert!(!table.has_column(Column::ObjectType));
}

#[tokio::test]
async fn when_satcat_matches_are_few_their_ids_bound_the_discos_request() {
    let dir = tempfile::tempdir().expect("temp dir");
    let http = ScriptedHttpClient::new(payload_pages());
    let catalog = catalog_in(dir.path(), http.clone());
    let filter = ObjectsFilter::from_pairs([("PAYLOAD", "true")]).expect("valid");

    catalog.objects_query(&filter, None).await.expect("merge succeeds");

    let requests = http.requests();
    let sent = requests[0].query_value("filter").expect("filter sent");
    assert!(sent.ends_with("&in(satno,(25544,20580))"), "{sent}");
    assert_eq!(requests[0].query_value("sort"), Some("satno"));
}

#[tokio::test]
async fn when_satcat_matches_exceed_the_bound_the_original_selector_is_used() {
    let dir = tempfile::tempdir().expect("temp dir");
    let http = ScriptedHttpClient::new(payload_pages());
    let catalog = catalog_with(dir.path(), http.clone(), |config| config.discos.id_bound = 1);
    let filter = ObjectsFilter::from_pairs([("PAYLOAD", "true")]).expect("valid");

    catalog.objects_query(&filter, None).await.expect("merge succeeds");

    let sent = http.requests()[0]
        .query_value("filter")
        .expect("filter sent")
        .to_owned();
    assert!(!sent.contains("satno"), "{sent}");
}

#[tokio::test]
async fn when_discos_returns_objects_outside_satcat_they_are_not_merged() {
    let dir = tempfile::tempdir().expect("temp dir");
    let http = ScriptedHttpClient::new(vec![discos_page(
        1,
        1,
        vec![
            discos_object(25544, "1998-067A", "ISS"),
            discos_object(99999, "2030-001A", "FUTURE"),
            json!({ "type": "object", "attributes": { "name": "NO SATNO" } }),
        ],
    )]);
    let catalog = catalog_with(dir.path(), http, |config| config.discos.id_bound = 0);

    let table = catalog
        .objects_query(&ObjectsFilter::default(), None)
        .await
        .expect("merge succeeds");

    assert_eq!(table.norad_ids(), vec![25544]);
}

#[tokio::test]
async fn when_the_magnitude_file_is_missing_std_mag_stays_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog = catalog_in(dir.path(), ScriptedHttpClient::new(payload_pages()));
    let filter = ObjectsFilter::from_pairs([("PAYLOAD", "true")]).expect("valid");

    let table = catalog.objects_query(&filter, None).await.expect("merge succeeds");

    assert!(table.rows().iter().all(|row| row.std_mag.is_none()));
    assert!(table.has_column(Column::StdMag));
}

#[tokio::test]
async fn when_objects_are_sorted_by_minus_mass_heaviest_comes_first() {
    let dir = tempfile::tempdir().expect("temp dir");
    let object = |satno: u32, cospar: &str, mass: f64| {
        json!({
            "type": "object",
            "attributes": { "satno": satno, "cosparId": cospar, "mass": mass }
        })
    };
    let http = ScriptedHttpClient::new(vec![discos_page(
        1,
        1,
        vec![
            object(20580, "1990-037B", 11110.0),
            object(25544, "1998-067A", 419725.0),
        ],
    )]);
    let catalog = catalog_in(dir.path(), http);
    let filter = ObjectsFilter::from_pairs([("PAYLOAD", "true")]).expect("valid");

    let table = catalog
        .objects_query(&filter, Some("-MASS"))
        .await
        .expect("merge succeeds");

    assert_eq!(table.norad_ids(), vec![25544, 20580]);
}

#[tokio::test]
async fn when_tle_status_is_true_the_merged_table_drops_data_status() {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog = catalog_in(dir.path(), ScriptedHttpClient::new(payload_pages()));
    let filter =
        ObjectsFilter::from_pairs([("PAYLOAD", "true"), ("TLE_STATUS", "true")]).expect("valid");

    let table = catalog.objects_query(&filter, None).await.expect("merge succeeds");

    assert!(!table.has_column(Column::DataStatusCode));
}

#[tokio::test]
async fn when_satcat_has_no_match_discos_is_never_queried() {
    let dir = tempfile::tempdir().expect("temp dir");
    let http = ScriptedHttpClient::new(Vec::new());
    let catalog = catalog_in(dir.path(), http.clone());
    let filter = ObjectsFilter::from_pairs([("MEAN_ALT", "10000,20000")]).expect("valid");

    let error = catalog
        .objects_query(&filter, None)
        .await
        .expect_err("must fail");

    assert!(matches!(error, QueryError::EmptyResult));
    assert!(http.requests().is_empty());
}

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn when_the_same_inputs_are_merged_twice_the_output_is_identical() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_qsmag(dir.path());
    let mut pages = payload_pages();
    pages.extend(payload_pages());
    let catalog = catalog_in(dir.path(), ScriptedHttpClient::new(pages));
    let filter = ObjectsFilter::from_pairs([("PAYLOAD", "true")]).expect("valid");

    let first = catalog.objects_query(&filter, None).await.expect("first merge");
    let second = catalog.objects_query(&filter, None).await.expect("second merge");

    assert_eq!(first.columns(), second.columns());
    assert_eq!(first, second);
}

// =============================================================================
// Join cardinality
// =============================================================================

fn record(cospar: &str, norad: u32) -> CatalogRecord {
    CatalogRecord {
        cospar_id: Some(cospar.to_owned()),
        norad_id: Some(norad),
        ..CatalogRecord::default()
    }
}

#[test]
fn when_satcat_has_a_duplicated_identifier_the_merge_fails() {
    // Given: Two SATCAT rows with the same key
    let celestrak = CatalogTable::new(
        Provenance::Celestrak,
        CELESTRAK_COLUMNS.to_vec(),
        vec![record("1998-067A", 25544), record("1998-067A", 25544)],
    );
    let discos = CatalogTable::new(
        Provenance::Discos,
        DISCOS_COLUMNS.to_vec(),
        vec![record("1998-067A", 25544)],
    );

    // When: Merging
    let error = merge_objects(celestrak, discos, &[], false).expect_err("must fail");

    // Then: The violation names the side and the key instead of picking a row
    match error {
        QueryError::JoinCardinality { side, key } => {
            assert_eq!(side, "celestrak");
            assert!(key.contains("25544"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn when_discos_has_a_duplicated_identifier_the_merge_fails() {
    let celestrak = CatalogTable::new(
        Provenance::Celestrak,
        CELESTRAK_COLUMNS.to_vec(),
        vec![record("1998-067A", 25544)],
    );
    let discos = CatalogTable::new(
        Provenance::Discos,
        DISCOS_COLUMNS.to_vec(),
        vec![record("1998-067A", 25544), record("1998-067A", 25544)],
    );

    let error = merge_objects(celestrak, discos, &[], false).expect_err("must fail");

    assert!(matches!(error, QueryError::JoinCardinality { side: "discos", .. }));
}

#[test]
fn when_magnitudes_repeat_an_identifier_the_merge_fails() {
    let celestrak = CatalogTable::new(
        Provenance::Celestrak,
        CELESTRAK_COLUMNS.to_vec(),
        vec![record("1998-067A", 25544)],
    );
    let discos = CatalogTable::new(
        Provenance::Discos,
        DISCOS_COLUMNS.to_vec(),
        vec![record("1998-067A", 25544)],
    );
    let magnitude = |std_mag| MagnitudeEntry {
        norad_id: 25544,
        name: String::from("ISS"),
        std_mag,
    };

    let error = merge_objects(celestrak, discos, &[magnitude(-1.8), magnitude(-1.5)], false)
        .expect_err("must fail");

    assert!(matches!(error, QueryError::JoinCardinality { side: "magnitude", .. }));
}
