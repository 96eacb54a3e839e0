use std::sync::Arc;

use crate::celestrak::{load_snapshot, SatcatSnapshot};
use crate::config::SatqueryConfig;
use crate::dataset::{download, ensure_fresh, is_stale, write_dataset};
use crate::discos::{discos_table, sort_param, translate, DiscosClient};
use crate::domain::{Column, IdSelector};
use crate::filter::{CelestrakFilter, DiscosFilter, ObjectsFilter};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::merge::merge_objects;
use crate::qsmag::{extract_qsmag, load_qsmag, MagnitudeEntry};
use crate::sort::{
    SortDirective, CELESTRAK_SORT_OPTIONS, DISCOS_SORT_OPTIONS, OBJECTS_SORT_OPTIONS,
};
use crate::spacetrack::{SpaceTrackClient, TleSet};
use crate::table::CatalogTable;
use crate::QueryError;

/// Data-access handle for the three query entry points.
///
/// Every query runs sequentially: SATCAT first (for merged queries), then
/// DISCOS page by page, then the magnitude file.
#[derive(Clone)]
pub struct Catalog {
    config: SatqueryConfig,
    http: Arc<dyn HttpClient>,
}

impl Catalog {
    pub fn new(config: SatqueryConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn with_reqwest(config: SatqueryConfig) -> Self {
        Self::new(config, Arc::new(ReqwestHttpClient::default()))
    }

    pub fn config(&self) -> &SatqueryConfig {
        &self.config
    }

    async fn discos_client(&self) -> Result<DiscosClient, QueryError> {
        let token = self.config.discos_token().await?;
        Ok(DiscosClient::new(
            Arc::clone(&self.http),
            self.config.discos.base_url.as_str(),
            token,
            self.config.discos_policy(),
        )
        .with_timeout_ms(self.config.discos.timeout_ms))
    }

    /// Queries DISCOS. Sorting happens on the server.
    pub async fn discos_query(
        &self,
        filter: &DiscosFilter,
        sort: Option<&str>,
    ) -> Result<CatalogTable, QueryError> {
        let directive = SortDirective::parse(sort, DISCOS_SORT_OPTIONS)?;
        let filter = filter.clone().load_id_files().await?;
        self.fetch_discos(&filter, &directive).await
    }

    async fn fetch_discos(
        &self,
        filter: &DiscosFilter,
        directive: &SortDirective,
    ) -> Result<CatalogTable, QueryError> {
        let expr = translate(filter)?;
        let sort = sort_param(directive)?;
        let objects = self
            .discos_client()
            .await?
            .fetch_objects(expr.as_ref(), &sort)
            .await?;
        Ok(discos_table(objects))
    }

    pub async fn load_satcat(&self) -> Result<SatcatSnapshot, QueryError> {
        load_snapshot(&self.config.satcat_path()).await
    }

    /// Filters the local SATCAT snapshot.
    pub async fn celestrak_query(
        &self,
        filter: &CelestrakFilter,
        sort: Option<&str>,
    ) -> Result<CatalogTable, QueryError> {
        let directive = SortDirective::parse(sort, CELESTRAK_SORT_OPTIONS)?;
        let filter = filter.clone().load_id_files().await?;
        let mut table = self.load_satcat().await?.query(&filter)?;
        table.sort_by(&directive);
        Ok(table)
    }

    async fn load_magnitudes(&self) -> Result<Vec<MagnitudeEntry>, QueryError> {
        let path = self.config.qsmag_path();
        if !tokio::fs::try_exists(&path).await? {
            tracing::warn!(path = %path.display(), "magnitude file not found, StdMag left empty");
            return Ok(Vec::new());
        }
        load_qsmag(&path).await
    }

    /// Merged SATCAT + DISCOS + magnitude query.
    ///
    /// The SATCAT result bounds the DISCOS request: when it holds at most
    /// `discos.id_bound` objects their ids replace the caller's NORAD_ID
    /// constraint.
    pub async fn objects_query(
        &self,
        filter: &ObjectsFilter,
        sort: Option<&str>,
    ) -> Result<CatalogTable, QueryError> {
        let directive = SortDirective::parse(sort, OBJECTS_SORT_OPTIONS)?;
        let filter = filter.clone().load_id_files().await?;

        let mut celestrak = self.load_satcat().await?.query(&filter.celestrak_filter())?;
        celestrak.drop_column(Column::ObjectName);
        if celestrak.is_empty() {
            return Err(QueryError::EmptyResult);
        }

        let ids = celestrak.norad_ids();
        let norad_id = if ids.len() <= self.config.discos.id_bound {
            Some(IdSelector::Literal(ids))
        } else {
            tracing::info!(
                satcat_rows = ids.len(),
                bound = self.config.discos.id_bound,
                "too many SATCAT matches to forward, querying DISCOS with the original selector"
            );
            filter.norad_id.clone()
        };

        let discos = self
            .fetch_discos(&filter.discos_filter(norad_id), &SortDirective::default())
            .await?;
        let magnitudes = self.load_magnitudes().await?;

        let mut merged = merge_objects(
            celestrak,
            discos,
            &magnitudes,
            filter.tle_status == Some(true),
        )?;
        merged.sort_by(&directive);
        Ok(merged)
    }

    /// Downloads the latest TLE of every id from Space-Track.
    pub async fn fetch_tles(&self, ids: &IdSelector) -> Result<TleSet, QueryError> {
        let ids = ids.clone().load().await?;
        let client = SpaceTrackClient::new(
            Arc::clone(&self.http),
            self.config.spacetrack.base_url.as_str(),
            self.config.spacetrack_credentials().await?,
            self.config.spacetrack_policy(),
        );
        client.fetch_latest_tles(ids.ids()?).await
    }

    /// Re-downloads the SATCAT snapshot when it is missing or older than the configured age.
    pub async fn refresh_satcat(&self) -> Result<bool, QueryError> {
        ensure_fresh(
            &self.config.satcat_path(),
            &self.config.satcat_url,
            self.config.satcat_max_age(),
            self.http.as_ref(),
        )
        .await
    }

    /// Re-downloads the McCants archive and unpacks `qs.mag` when the
    /// magnitude file is missing or older than the configured age.
    pub async fn refresh_qsmag(&self) -> Result<bool, QueryError> {
        let path = self.config.qsmag_path();
        if !is_stale(&path, self.config.qsmag_max_age()).await? {
            tracing::debug!(path = %path.display(), "magnitude file is up to date");
            return Ok(false);
        }

        let url = self.config.qsmag_url.as_str();
        tracing::info!(url, path = %path.display(), "downloading magnitude archive");
        let archive = download(url, self.http.as_ref()).await?;
        let contents = extract_qsmag(archive).await?;
        write_dataset(&path, &contents).await?;
        Ok(true)
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
