//! Wire-level contracts of the remote providers: the DISCOS objects
//! endpoint, the Space-Track TLE API and the SATCAT and qs.mag downloads.

use std::sync::Arc;
use std::time::Duration;

use satquery_core::{
    DiscosClient, DiscosError, DiscosPolicy, HttpError, HttpMethod, HttpResponse, IdSelector,
    QueryError, SpaceTrackClient, SpaceTrackCredentials, SpaceTrackError, SpaceTrackPolicy,
    TleDirMode, ValidationError,
};

use satquery_tests::{
    catalog_in, catalog_with, discos_object, discos_page, qsmag_archive, qsmag_file, qsmag_line,
    ScriptedHttpClient, SATCAT,
};

const ISS_TLE: &str = "\
1 25544U 98067A   21275.52418981  .00001878  00000-0  42617-4 0  9993
2 25544  51.6442 172.9074 0004047  68.4379  38.1691 15.48861681305238
";

const HST_TLE: &str = "\
1 20580U 90037B   21275.12345678  .00000812  00000-0  39041-4 0  9995
2 20580  28.4699 341.2759 0002727 112.4712 312.1689 15.09762473522749
";

fn discos_client(http: Arc<ScriptedHttpClient>) -> DiscosClient {
    DiscosClient::new(
        http,
        "https://discos.test/",
        "token-abc",
        DiscosPolicy {
            cooldown: Duration::ZERO,
            ..DiscosPolicy::default()
        },
    )
}

// =============================================================================
// DISCOS pagination
// =============================================================================

#[tokio::test]
async fn discos_pages_are_requested_in_order_until_the_last_one() {
    // Given: Three result pages
    let http = ScriptedHttpClient::new(vec![
        discos_page(1, 3, vec![discos_object(1, "1957-001A", "A")]),
        discos_page(2, 3, vec![discos_object(2, "1957-002A", "B")]),
        discos_page(3, 3, vec![discos_object(3, "1958-001A", "C")]),
    ]);
    let client = discos_client(http.clone());

    // When: Fetching every object
    let objects = client.fetch_objects(None, "satno").await.expect("fetch succeeds");

    // Then: Records are concatenated in page order, one request per page
    let satnos: Vec<_> = objects.iter().filter_map(|object| object.satno).collect();
    assert_eq!(satnos, vec![1, 2, 3]);

    let requests = http.requests();
    let pages: Vec<_> = requests
        .iter()
        .map(|request| request.query_value("page[number]").map(str::to_owned))
        .collect();
    assert_eq!(
        pages,
        vec![Some("1".to_owned()), Some("2".to_owned()), Some("3".to_owned())]
    );
    for request in &requests {
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://discos.test/api/objects");
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer token-abc")
        );
        assert_eq!(
            request.headers.get("accept").map(String::as_str),
            Some("application/vnd.api+json")
        );
    }
}

#[tokio::test]
async fn discos_empty_page_after_the_first_stops_the_walk() {
    let http = ScriptedHttpClient::new(vec![
        discos_page(1, 3, vec![discos_object(1, "1957-001A", "A")]),
        discos_page(2, 3, Vec::new()),
    ]);
    let client = discos_client(http.clone());

    let objects = client.fetch_objects(None, "satno").await.expect("partial walk");

    assert_eq!(objects.len(), 1);
    assert_eq!(http.requests().len(), 2);
}

#[tokio::test]
async fn discos_transport_failure_aborts_without_retry() {
    let http = ScriptedHttpClient::new(vec![
        discos_page(1, 2, vec![discos_object(1, "1957-001A", "A")]),
        Err(HttpError::new("connection reset")),
    ]);
    let client = discos_client(http.clone());

    let error = client
        .fetch_objects(None, "satno")
        .await
        .expect_err("must fail");

    assert_eq!(error, DiscosError::Transport(String::from("connection reset")));
    assert_eq!(http.requests().len(), 2);
}

#[tokio::test]
async fn discos_error_body_that_is_not_json_is_kept_as_detail() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::with_status(502, "Bad Gateway"))]);
    let client = discos_client(http);

    let error = client
        .fetch_objects(None, "satno")
        .await
        .expect_err("must fail");

    match error {
        DiscosError::Api { status, errors } => {
            assert_eq!(status, 502);
            assert_eq!(errors[0].detail.as_deref(), Some("Bad Gateway"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn discos_cooldown_is_due_after_every_twentieth_page_while_pages_remain() {
    let policy = DiscosPolicy::default();

    let due: Vec<u32> = (1..=45).filter(|page| policy.cooldown_due(*page, 45)).collect();

    assert_eq!(due, vec![20, 40]);
    assert!(!policy.cooldown_due(20, 20), "no pause after the final page");
}

// =============================================================================
// Space-Track TLE download
// =============================================================================

fn spacetrack_client(http: Arc<ScriptedHttpClient>, batch_size: usize) -> SpaceTrackClient {
    SpaceTrackClient::new(
        http,
        "https://spacetrack.test",
        SpaceTrackCredentials::new("user@example.org", "s3cret"),
        SpaceTrackPolicy {
            batch_size,
            ..SpaceTrackPolicy::default()
        },
    )
}

#[tokio::test]
async fn spacetrack_logs_in_then_downloads_one_batch_per_chunk() {
    // Given: A batch size of two and three requested ids
    let http = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::ok("\"\"")),
        Ok(HttpResponse::ok(format!("{ISS_TLE}{HST_TLE}"))),
        Ok(HttpResponse::ok("")),
    ]);
    let client = spacetrack_client(http.clone(), 2);

    // When: Downloading with a repeated id
    let set = client
        .fetch_latest_tles(&[25544, 20580, 25544, 43013])
        .await
        .expect("download succeeds");

    // Then: A login form is posted, ids are deduplicated and batched
    let requests = http.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, "https://spacetrack.test/ajaxauth/login");
    assert_eq!(
        requests[0].body.as_deref(),
        Some("identity=user%40example.org&password=s3cret")
    );
    assert_eq!(
        requests[1].url,
        "https://spacetrack.test/basicspacedata/query/class/tle_latest/NORAD_CAT_ID/25544,20580/ORDINAL/1/format/tle"
    );
    assert!(requests[2].url.contains("/NORAD_CAT_ID/43013/"));

    assert_eq!(set.lines.len(), 4);
    assert_eq!(set.missing, vec![43013]);
}

#[tokio::test]
async fn spacetrack_rejected_login_stops_before_any_download() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok(
        r#"{"Login":"Failed"}"#,
    ))]);
    let client = spacetrack_client(http.clone(), 500);

    let error = client
        .fetch_latest_tles(&[25544])
        .await
        .expect_err("must fail");

    assert!(matches!(error, QueryError::SpaceTrack(SpaceTrackError::Login(_))));
    assert_eq!(http.requests().len(), 1);
}

#[tokio::test]
async fn spacetrack_empty_id_list_is_rejected_without_login() {
    let http = ScriptedHttpClient::new(Vec::new());
    let client = spacetrack_client(http.clone(), 500);

    let error = client.fetch_latest_tles(&[]).await.expect_err("must fail");

    assert!(matches!(error, QueryError::Validation(ValidationError::EmptyIdList)));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn tle_files_are_written_with_missing_ids_listed_separately() {
    // Given: Credentials in the data directory and one id without elements
    let dir = tempfile::tempdir().expect("temp dir");
    let http = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::ok("\"\"")),
        Ok(HttpResponse::ok(ISS_TLE)),
    ]);
    let catalog = catalog_in(dir.path(), http);
    std::fs::write(dir.path().join("spacetrack-login"), "user@example.org\ns3cret\n")
        .expect("login fixture");
    let out = dir.path().join("TLE");
    std::fs::create_dir_all(&out).expect("out dir");
    std::fs::write(out.join("stale.txt"), "old").expect("stale file");

    // When: Fetching and saving into a cleared directory
    let set = catalog
        .fetch_tles(&IdSelector::Literal(vec![25544, 43013]))
        .await
        .expect("download succeeds");
    let files = set.save(Some(&out), TleDirMode::Clear).await.expect("saved");

    // Then: The TLE file holds both lines and the missing id has its own file
    assert!(!out.join("stale.txt").exists());
    assert_eq!(std::fs::read_to_string(&files.tle).expect("tle file"), ISS_TLE);
    let missed = files.missed_ids.expect("missing ids file");
    assert_eq!(std::fs::read_to_string(missed).expect("missed file"), "43013\n");
}

#[tokio::test]
async fn tle_fetch_without_credentials_names_the_expected_sources() {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog = catalog_in(dir.path(), ScriptedHttpClient::new(Vec::new()));

    let error = catalog
        .fetch_tles(&IdSelector::one(25544))
        .await
        .expect_err("must fail");

    let message = error.to_string();
    assert!(message.contains("SATQUERY_SPACETRACK_USER"), "{message}");
    assert!(message.contains("spacetrack-login"), "{message}");
}

// =============================================================================
// SATCAT download
// =============================================================================

#[tokio::test]
async fn satcat_refresh_downloads_only_when_the_snapshot_is_stale() {
    // Given: A fresh snapshot on disk
    let dir = tempfile::tempdir().expect("temp dir");
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok(SATCAT))]);
    let catalog = catalog_in(dir.path(), http.clone());

    // When: Refreshing with the default seven-day threshold
    let refreshed = catalog.refresh_satcat().await.expect("refresh check");

    // Then: Nothing is downloaded
    assert!(!refreshed);
    assert!(http.requests().is_empty());

    // When: The snapshot lives somewhere that does not exist yet
    let elsewhere = dir.path().join("cache").join("satcat.csv");
    let catalog = catalog_with(dir.path(), http.clone(), |config| {
        config.satcat_path = Some(elsewhere.clone());
        config.satcat_url = String::from("https://celestrak.test/satcat.csv");
    });
    let refreshed = catalog.refresh_satcat().await.expect("download");

    // Then: It is downloaded from the configured URL
    assert!(refreshed);
    assert_eq!(http.requests()[0].url, "https://celestrak.test/satcat.csv");
    assert_eq!(std::fs::read_to_string(&elsewhere).expect("downloaded"), SATCAT);
}

// =============================================================================
// qs.mag download
// =============================================================================

#[tokio::test]
async fn qsmag_refresh_unpacks_the_archive_once_per_age_window() {
    // Given: No magnitude file yet and a zipped qs.mag on the server
    let dir = tempfile::tempdir().expect("temp dir");
    let text = qsmag_file(&[qsmag_line(25544, "ISS (ZARYA)", "-1.8")]);
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok(qsmag_archive(&text)))]);
    let catalog = catalog_in(dir.path(), http.clone());

    // When: Refreshing the magnitude file
    let refreshed = catalog.refresh_qsmag().await.expect("download");

    // Then: The archive is fetched and its qs.mag entry written in place
    assert!(refreshed);
    assert_eq!(http.requests()[0].url, "https://mccants.test/qsmag.zip");
    let extracted = std::fs::read_to_string(dir.path().join("qs.mag")).expect("extracted");
    assert_eq!(extracted, text);

    // When: Refreshing again inside the 180-day window
    let refreshed = catalog.refresh_qsmag().await.expect("refresh check");

    // Then: Nothing else is downloaded
    assert!(!refreshed);
    assert_eq!(http.requests().len(), 1);
}

#[tokio::test]
async fn qsmag_refresh_rejects_a_body_that_is_not_an_archive() {
    // Given: A server answering with an HTML page instead of the zip
    let dir = tempfile::tempdir().expect("temp dir");
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok("<html>moved</html>"))]);
    let catalog = catalog_in(dir.path(), http);

    // When: Refreshing the magnitude file
    let error = catalog.refresh_qsmag().await.expect_err("must fail");

    // Then: The archive error surfaces and no qs.mag is written
    assert!(matches!(error, QueryError::Archive(_)));
    assert!(!dir.path().join("qs.mag").exists());
}
