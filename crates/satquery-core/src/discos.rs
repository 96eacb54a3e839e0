//! DISCOS (ESA) objects catalog: filter translation and paginated fetch.
//!
//! [`translate`] turns a [`DiscosFilter`] into an [`Expr`] in the DISCOS
//! filter grammar. [`DiscosClient::fetch_objects`] walks every result page
//! sequentially, pausing for the configured cooldown after each block of
//! pages, and fails on the first non-success response without retrying.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{CatalogRecord, Column, IdSelector, NumericRange, TextMatch};
use crate::expr::{Expr, Op, Value};
use crate::filter::DiscosFilter;
use crate::http_client::{HttpAuth, HttpClient, HttpError, HttpRequest};
use crate::provider_policy::{DiscosPolicy, ProviderId};
use crate::sort::{SortDirective, DISCOS_SORT_OPTIONS};
use crate::table::{CatalogTable, Provenance};
use crate::ValidationError;

pub const DEFAULT_DISCOS_URL: &str = "https://discosweb.esoc.esa.int";

/// Object classes counted as payloads (`PAYLOAD=true`).
pub const PAYLOAD_CLASSES: &[&str] = &[
    "Payload",
    "Payload Mission Related Object",
    "Rocket Mission Related Object",
    "Other Mission Related Object",
    "Unknown",
];

/// Object classes counted as non-payloads (`PAYLOAD=false`).
pub const NON_PAYLOAD_CLASSES: &[&str] = &[
    "Payload Debris",
    "Payload Fragmentation Debris",
    "Rocket Body",
    "Rocket Debris",
    "Rocket Fragmentation Debris",
    "Other Debris",
];

/// Schema of a DISCOS-only result table.
pub const DISCOS_COLUMNS: &[Column] = &[
    Column::ObjectName,
    Column::CosparId,
    Column::NoradId,
    Column::ObjectClass,
    Column::Mass,
    Column::Shape,
    Column::Height,
    Column::Length,
    Column::Depth,
    Column::RcsMin,
    Column::RcsMax,
    Column::RcsAvg,
];

const LINEAR_DECIMALS: usize = 2;
const CROSS_SECTION_DECIMALS: usize = 4;
const REENTRY_EPOCH: &str = "reentry.epoch";

/// Builds the DISCOS filter expression, or `None` when no constraint is set.
///
/// A NORAD id file is read here and substituted as a literal list.
pub fn translate(filter: &DiscosFilter) -> Result<Option<Expr>, ValidationError> {
    let mut clauses = Vec::new();

    if let Some(classes) = &filter.object_class {
        clauses.extend(class_clause(classes.iter().map(String::as_str)));
    }

    if let Some(payload) = filter.payload {
        let classes = if payload {
            PAYLOAD_CLASSES
        } else {
            NON_PAYLOAD_CLASSES
        };
        clauses.extend(class_clause(classes.iter().copied()));
    }

    if let Some(decayed) = filter.decayed {
        let op = if decayed { Op::Ne } else { Op::Eq };
        clauses.push(Expr::cmp(op, REENTRY_EPOCH, Value::Null));
    }

    if let Some(window) = filter.decay_date {
        clauses.push(Expr::between(
            REENTRY_EPOCH,
            Value::Epoch(window.lo),
            Value::Epoch(window.hi),
        ));
    }

    if let Some(cospar_ids) = &filter.cospar_id {
        clauses.extend(membership(
            "cosparId",
            cospar_ids.iter().map(|id| Value::str(id.as_str())).collect(),
        ));
    }

    if let Some(selector) = &filter.norad_id {
        clauses.extend(norad_clause(selector)?);
    }

    clauses.extend(range("mass", filter.mass, LINEAR_DECIMALS));

    if let Some(shape) = &filter.shape {
        clauses.extend(shape_clause(shape));
    }

    clauses.extend(range("length", filter.length, LINEAR_DECIMALS));
    clauses.extend(range("height", filter.height, LINEAR_DECIMALS));
    clauses.extend(range("depth", filter.depth, LINEAR_DECIMALS));
    clauses.extend(range("xSectMin", filter.rcs_min, CROSS_SECTION_DECIMALS));
    clauses.extend(range("xSectMax", filter.rcs_max, CROSS_SECTION_DECIMALS));
    clauses.extend(range("xSectAvg", filter.rcs_avg, CROSS_SECTION_DECIMALS));

    Ok(Expr::all(clauses))
}

fn class_clause<'a>(classes: impl Iterator<Item = &'a str>) -> Option<Expr> {
    Expr::any_of(
        classes
            .map(|class| Expr::cmp(Op::Eq, "objectClass", Value::str(class)))
            .collect(),
    )
}

fn membership(field: &'static str, mut values: Vec<Value>) -> Option<Expr> {
    match values.len() {
        0 => None,
        1 => values.pop().map(|value| Expr::cmp(Op::Eq, field, value)),
        _ => Some(Expr::cmp(Op::In, field, Value::List(values))),
    }
}

fn norad_clause(selector: &IdSelector) -> Result<Option<Expr>, ValidationError> {
    let ids = selector.ids()?;
    if ids.is_empty() {
        return Err(ValidationError::EmptyIdList);
    }
    Ok(membership(
        "satno",
        ids.iter().map(|id| Value::Int(u64::from(*id))).collect(),
    ))
}

fn range(field: &'static str, bounds: Option<NumericRange>, decimals: usize) -> Option<Expr> {
    bounds.map(|bounds| {
        Expr::between(
            field,
            Value::fixed(bounds.lo, decimals),
            Value::fixed(bounds.hi, decimals),
        )
    })
}

fn shape_clause(shape: &TextMatch) -> Option<Expr> {
    let clauses = shape
        .terms()
        .iter()
        .map(|term| Expr::cmp(Op::IContains, "shape", Value::str(term.as_str())))
        .collect();
    match shape {
        TextMatch::Any(_) => Expr::any_of(clauses),
        TextMatch::All(_) => Expr::all(clauses),
    }
}

/// DISCOS attribute name used for server-side sorting on `column`.
pub const fn sort_key(column: Column) -> Option<&'static str> {
    match column {
        Column::CosparId => Some("cosparId"),
        Column::NoradId => Some("satno"),
        Column::ObjectClass => Some("objectClass"),
        Column::Mass => Some("mass"),
        Column::Shape => Some("shape"),
        Column::Length => Some("length"),
        Column::Height => Some("height"),
        Column::Depth => Some("depth"),
        Column::RcsMin => Some("xSectMin"),
        Column::RcsMax => Some("xSectMax"),
        Column::RcsAvg => Some("xSectAvg"),
        Column::DecayDate => Some(REENTRY_EPOCH),
        _ => None,
    }
}

/// Value of the `sort` query parameter, `-` prefixed when descending.
pub fn sort_param(directive: &SortDirective) -> Result<String, ValidationError> {
    let key = sort_key(directive.column).ok_or_else(|| ValidationError::UnknownSortKey {
        given: directive.column.as_str().to_owned(),
        options: DISCOS_SORT_OPTIONS.iter().map(|column| column.as_str()).collect(),
    })?;
    Ok(if directive.descending {
        format!("-{key}")
    } else {
        key.to_owned()
    })
}

/// Attributes of one object as returned by `/api/objects`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscosAttributes {
    pub name: Option<String>,
    pub satno: Option<u32>,
    pub cospar_id: Option<String>,
    pub object_class: Option<String>,
    pub mass: Option<f64>,
    pub shape: Option<String>,
    pub height: Option<f64>,
    pub length: Option<f64>,
    pub depth: Option<f64>,
    pub x_sect_min: Option<f64>,
    pub x_sect_max: Option<f64>,
    pub x_sect_avg: Option<f64>,
}

impl From<DiscosAttributes> for CatalogRecord {
    fn from(attributes: DiscosAttributes) -> Self {
        Self {
            object_name: attributes.name,
            cospar_id: attributes.cospar_id,
            norad_id: attributes.satno,
            object_class: attributes.object_class,
            mass: attributes.mass,
            shape: attributes.shape,
            height: attributes.height,
            length: attributes.length,
            depth: attributes.depth,
            rcs_min: attributes.x_sect_min,
            rcs_max: attributes.x_sect_max,
            rcs_avg: attributes.x_sect_avg,
            ..Self::default()
        }
    }
}

/// Wraps fetched objects into a table, keeping the server's order.
pub fn discos_table(objects: Vec<DiscosAttributes>) -> CatalogTable {
    CatalogTable::new(
        Provenance::Discos,
        DISCOS_COLUMNS.to_vec(),
        objects.into_iter().map(CatalogRecord::from).collect(),
    )
}

/// One entry of the provider's `errors` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiErrorPayload {
    pub status: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
}

impl ApiErrorPayload {
    fn summary(&self) -> &str {
        self.detail
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("no detail")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscosError {
    #[error("DISCOS request failed with status {status}: {}", summarize(.errors))]
    Api {
        status: u16,
        errors: Vec<ApiErrorPayload>,
    },
    #[error("DISCOS transport error: {0}")]
    Transport(String),
    #[error("DISCOS response could not be decoded: {0}")]
    Decode(String),
    #[error("no entries found, please reset the filter parameters")]
    EmptyResult,
}

fn summarize(errors: &[ApiErrorPayload]) -> String {
    if errors.is_empty() {
        return String::from("no error payload");
    }
    errors
        .iter()
        .map(ApiErrorPayload::summary)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<HttpError> for DiscosError {
    fn from(error: HttpError) -> Self {
        Self::Transport(error.message().to_owned())
    }
}

#[derive(Debug, Deserialize)]
struct ObjectsPage {
    #[serde(default)]
    data: Vec<ObjectResource>,
    meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
struct ObjectResource {
    #[serde(default)]
    attributes: DiscosAttributes,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    current_page: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    errors: Vec<ApiErrorPayload>,
}

/// Authenticated client for the DISCOS objects endpoint.
#[derive(Clone)]
pub struct DiscosClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    policy: DiscosPolicy,
    timeout_ms: u64,
}

impl DiscosClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        token: impl Into<String>,
        policy: DiscosPolicy,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth: HttpAuth::BearerToken(token.into()),
            policy,
            timeout_ms: 30_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn policy(&self) -> &DiscosPolicy {
        &self.policy
    }

    fn page_request(&self, filter: Option<&str>, sort: &str, page: u32) -> HttpRequest {
        let mut request = HttpRequest::get(format!("{}/api/objects", self.base_url))
            .with_auth(&self.auth)
            .with_header("accept", "application/vnd.api+json")
            .with_timeout_ms(self.timeout_ms);
        if let Some(filter) = filter {
            request = request.with_query("filter", filter);
        }
        request
            .with_query("sort", sort)
            .with_query("page[number]", page.to_string())
            .with_query("page[size]", self.policy.page_size.to_string())
    }

    /// Fetches every page matching `filter`, in server order.
    pub async fn fetch_objects(
        &self,
        filter: Option<&Expr>,
        sort: &str,
    ) -> Result<Vec<DiscosAttributes>, DiscosError> {
        let rendered = filter.map(ToString::to_string);
        tracing::debug!(
            provider = %ProviderId::Discos,
            filter = rendered.as_deref().unwrap_or(""),
            sort,
            "querying objects"
        );

        let mut objects = Vec::new();
        let mut page_number = 1_u32;
        let mut total_pages = None;

        loop {
            let request = self.page_request(rendered.as_deref(), sort, page_number);
            let response = self.http.execute(request).await?;

            if !response.is_success() {
                let errors = serde_json::from_slice::<ErrorDocument>(&response.body)
                    .map(|document| document.errors)
                    .unwrap_or_else(|_| {
                        vec![ApiErrorPayload {
                            detail: Some(response.text().into_owned()),
                            ..ApiErrorPayload::default()
                        }]
                    });
                return Err(DiscosError::Api {
                    status: response.status,
                    errors,
                });
            }

            let page: ObjectsPage = serde_json::from_slice(&response.body)
                .map_err(|error| DiscosError::Decode(error.to_string()))?;

            if page.data.is_empty() {
                if page_number == 1 {
                    return Err(DiscosError::EmptyResult);
                }
                tracing::warn!(page = page_number, "empty page before the last one, stopping");
                break;
            }

            objects.extend(page.data.into_iter().map(|resource| resource.attributes));

            let pagination = page
                .meta
                .map(|meta| meta.pagination)
                .ok_or_else(|| DiscosError::Decode(String::from("missing meta.pagination")))?;
            if pagination.current_page != page_number {
                return Err(DiscosError::Decode(format!(
                    "requested page {page_number} but received page {}",
                    pagination.current_page
                )));
            }
            // The page count announced by the first page bounds the walk.
            let total_pages = *total_pages.get_or_insert(pagination.total_pages);
            tracing::info!(
                current_page = page_number,
                total_pages,
                objects = objects.len(),
                "fetched objects page"
            );

            if page_number >= total_pages {
                break;
            }

            if self.policy.cooldown_due(page_number, total_pages) {
                tracing::info!(
                    seconds = self.policy.cooldown.as_secs(),
                    "pausing to respect the request budget"
                );
                tokio::time::sleep(self.policy.cooldown).await;
            }
            page_number += 1;
        }

        Ok(objects)
    }
}

impl std::fmt::Debug for DiscosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscosClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("policy", &self.policy)
            .finish()
    }
}
