//! Space-Track latest-TLE downloads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::domain::utc_date_stamp;
use crate::http_client::{HttpClient, HttpError, HttpRequest};
use crate::provider_policy::{ProviderId, SpaceTrackPolicy};
use crate::throttling::RequestThrottle;
use crate::{QueryError, ValidationError};

pub const DEFAULT_SPACETRACK_URL: &str = "https://www.space-track.org";

/// Directory used by [`TleSet::save`] when none is given.
pub const DEFAULT_TLE_DIR: &str = "TLE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpaceTrackError {
    #[error("Space-Track login failed: {0}")]
    Login(String),
    #[error("Space-Track transport error: {0}")]
    Transport(String),
    #[error("Space-Track request failed with status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<HttpError> for SpaceTrackError {
    fn from(error: HttpError) -> Self {
        Self::Transport(error.message().to_owned())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SpaceTrackCredentials {
    pub username: String,
    pub password: String,
}

impl SpaceTrackCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parses a login file: username on the first line, password on the second.
    pub fn from_login_file(contents: &str) -> Option<Self> {
        let mut lines = contents.lines().map(str::trim);
        let username = lines.next().filter(|line| !line.is_empty())?;
        let password = lines.next().filter(|line| !line.is_empty())?;
        Some(Self::new(username, password))
    }
}

impl std::fmt::Debug for SpaceTrackCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceTrackCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What to do with files already in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TleDirMode {
    #[default]
    Keep,
    Clear,
}

/// Downloaded TLE lines and the requested ids that had no element set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TleSet {
    pub lines: Vec<String>,
    pub missing: Vec<u32>,
}

/// Paths written by [`TleSet::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleFiles {
    pub tle: PathBuf,
    pub missed_ids: Option<PathBuf>,
}

impl TleSet {
    /// Builds the set from raw lines, marking every id that has a line 2 as returned.
    pub fn from_lines(requested: &[u32], lines: Vec<String>) -> Self {
        let returned: HashSet<u32> = lines.iter().filter_map(|line| line_two_id(line)).collect();
        let mut missing: Vec<u32> = requested
            .iter()
            .copied()
            .filter(|id| !returned.contains(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        Self { lines, missing }
    }

    /// Writes `tle_<YYYYMMDD>.txt` and, when ids are missing, `missed_ids_<YYYYMMDD>.txt`.
    pub async fn save(&self, dir: Option<&Path>, mode: TleDirMode) -> Result<TleFiles, QueryError> {
        let dir = dir.unwrap_or_else(|| Path::new(DEFAULT_TLE_DIR));
        if mode == TleDirMode::Clear && tokio::fs::try_exists(dir).await? {
            let mut entries = tokio::fs::read_dir(dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_file() {
                    tokio::fs::remove_file(entry.path()).await?;
                }
            }
        }
        tokio::fs::create_dir_all(dir).await?;

        let stamp = utc_date_stamp();
        let tle = dir.join(format!("tle_{stamp}.txt"));
        tokio::fs::write(&tle, join_lines(self.lines.iter())).await?;

        let missed_ids = if self.missing.is_empty() {
            None
        } else {
            let path = dir.join(format!("missed_ids_{stamp}.txt"));
            let ids = self.missing.iter().map(u32::to_string);
            tokio::fs::write(&path, join_lines(ids)).await?;
            tracing::warn!(
                missing = self.missing.len(),
                path = %path.display(),
                "some objects have no available TLE"
            );
            Some(path)
        };

        Ok(TleFiles { tle, missed_ids })
    }
}

fn join_lines<I, S>(lines: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    lines.fold(String::new(), |mut out, line| {
        out.push_str(line.as_ref());
        out.push('\n');
        out
    })
}

/// Catalog number of a TLE line 2 (`2 25544 ...`); leading zeros are ignored.
fn line_two_id(line: &str) -> Option<u32> {
    let mut words = line.split_whitespace();
    if words.next()? != "2" {
        return None;
    }
    words.next()?.parse().ok()
}

/// Session client for the Space-Track query API.
#[derive(Clone)]
pub struct SpaceTrackClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    credentials: SpaceTrackCredentials,
    policy: SpaceTrackPolicy,
    throttle: RequestThrottle,
}

impl SpaceTrackClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        credentials: SpaceTrackCredentials,
        policy: SpaceTrackPolicy,
    ) -> Self {
        let throttle = RequestThrottle::from_policy(&policy);
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credentials,
            policy,
            throttle,
        }
    }

    pub async fn login(&self) -> Result<(), SpaceTrackError> {
        let request = HttpRequest::post(format!("{}/ajaxauth/login", self.base_url)).with_form(&[
            ("identity", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ]);

        self.throttle.wait().await;
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(SpaceTrackError::Login(format!("status {}", response.status)));
        }
        if response.text().contains("Failed") {
            return Err(SpaceTrackError::Login(String::from(
                "credentials were rejected",
            )));
        }
        tracing::info!(provider = %ProviderId::SpaceTrack, "logged in");
        Ok(())
    }

    fn batch_request(&self, ids: &[u32]) -> HttpRequest {
        let ids = ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        HttpRequest::get(format!(
            "{}/basicspacedata/query/class/tle_latest/NORAD_CAT_ID/{ids}/ORDINAL/1/format/tle",
            self.base_url
        ))
    }

    /// Logs in and downloads the latest TLE of every id, in batches.
    pub async fn fetch_latest_tles(&self, ids: &[u32]) -> Result<TleSet, QueryError> {
        let mut seen = HashSet::new();
        let ids: Vec<u32> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Err(ValidationError::EmptyIdList.into());
        }

        self.login().await?;

        let batch_size = self.policy.batch_size.max(1);
        let batches = ids.len().div_ceil(batch_size);
        let mut lines = Vec::new();
        for (index, batch) in ids.chunks(batch_size).enumerate() {
            self.throttle.wait().await;
            tracing::info!(
                batch = index + 1,
                batches,
                ids = batch.len(),
                "downloading TLE batch"
            );

            let response = self
                .http
                .execute(self.batch_request(batch))
                .await
                .map_err(SpaceTrackError::from)?;
            if !response.is_success() {
                return Err(SpaceTrackError::Status {
                    status: response.status,
                    body: response.text().into_owned(),
                }
                .into());
            }
            lines.extend(
                response
                    .text()
                    .lines()
                    .map(|line| line.trim_end().to_owned())
                    .filter(|line| !line.is_empty()),
            );
        }

        let set = TleSet::from_lines(&ids, lines);
        tracing::info!(
            requested = ids.len(),
            missing = set.missing.len(),
            "downloaded TLE data"
        );
        Ok(set)
    }
}

impl std::fmt::Debug for SpaceTrackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceTrackClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;
    use crate::http_client::{HttpMethod, HttpResponse};

    const ISS_TLE: &str = "\
1 25544U 98067A   21275.52418981  .00001878  00000-0  42617-4 0  9993
2 25544  51.6442 172.9074 0004047  68.4379  38.1691 15.48861681305238
";

    struct LoginThenTles {
        login_body: &'static str,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl LoginThenTles {
        fn new(login_body: &'static str) -> Self {
            Self {
                login_body,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for LoginThenTles {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = if request.method == HttpMethod::Post {
                HttpResponse::ok(self.login_body)
            } else if request.url.contains("25544") {
                HttpResponse::ok(ISS_TLE)
            } else {
                HttpResponse::ok("")
            };
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            Box::pin(async move { Ok(response) })
        }
    }

    fn client(http: Arc<LoginThenTles>, batch_size: usize) -> SpaceTrackClient {
        SpaceTrackClient::new(
            http,
            "https://spacetrack.test",
            SpaceTrackCredentials::new("user@example.com", "secret"),
            SpaceTrackPolicy {
                batch_size,
                ..SpaceTrackPolicy::default()
            },
        )
    }

    #[test]
    fn line_two_marks_the_catalog_number() {
        let set = TleSet::from_lines(
            &[25544, 5, 43013],
            ISS_TLE.lines().map(str::to_owned).collect(),
        );
        assert_eq!(set.missing, vec![5, 43013]);
        assert_eq!(line_two_id("2 00005  34.2"), Some(5));
        assert_eq!(line_two_id("1 00005U 58002B"), None);
    }

    #[test]
    fn login_file_needs_two_lines() {
        let credentials = SpaceTrackCredentials::from_login_file("me\npw\n").expect("parses");
        assert_eq!(credentials.username, "me");
        assert!(SpaceTrackCredentials::from_login_file("me\n").is_none());
        assert!(!format!("{credentials:?}").contains("pw"));
    }

    #[tokio::test]
    async fn downloads_in_batches_after_login() {
        let http = Arc::new(LoginThenTles::new(""));
        let set = client(http.clone(), 2)
            .fetch_latest_tles(&[25544, 5, 25544, 43013])
            .await
            .expect("downloads");

        assert_eq!(set.lines.len(), 2);
        assert_eq!(set.missing, vec![5, 43013]);

        let requests = http.recorded_requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].url, "https://spacetrack.test/ajaxauth/login");
        assert_eq!(
            requests[0].body.as_deref(),
            Some("identity=user%40example.com&password=secret")
        );
        assert!(requests[1].url.ends_with("/NORAD_CAT_ID/25544,5/ORDINAL/1/format/tle"));
        assert!(requests[2].url.contains("/NORAD_CAT_ID/43013/"));
    }

    #[tokio::test]
    async fn rejected_login_stops_before_downloading() {
        let http = Arc::new(LoginThenTles::new(r#"{"Login":"Failed"}"#));
        let error = client(http.clone(), 500)
            .fetch_latest_tles(&[25544])
            .await
            .expect_err("must fail");
        assert!(matches!(error, QueryError::SpaceTrack(SpaceTrackError::Login(_))));
        assert_eq!(http.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn empty_id_list_is_rejected() {
        let http = Arc::new(LoginThenTles::new(""));
        let error = client(http, 500).fetch_latest_tles(&[]).await.expect_err("must fail");
        assert!(matches!(error, QueryError::Validation(ValidationError::EmptyIdList)));
    }

    #[tokio::test]
    async fn save_writes_tle_and_missed_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("old.txt"), "stale").expect("seed");
        let set = TleSet {
            lines: vec![String::from("1 A"), String::from("2 B")],
            missing: vec![5],
        };

        let files = set
            .save(Some(dir.path()), TleDirMode::Clear)
            .await
            .expect("saves");

        assert!(!dir.path().join("old.txt").exists());
        assert_eq!(std::fs::read_to_string(&files.tle).unwrap(), "1 A\n2 B\n");
        let missed = files.missed_ids.expect("missing ids written");
        assert_eq!(std::fs::read_to_string(missed).unwrap(), "5\n");
    }
}
