use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error};
use url::Url;

use super::{CurriculumStore, OutcomeFacet, OutcomeFilter};
use crate::domain::curriculum::{CurriculumField, CurriculumOutcome, RecordId, StoredOutcome};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::BackendCredentials;

const FACET_PAGE_SIZE: usize = 1000;

/// Error body returned by the backend's REST layer
#[derive(Debug, Default, Deserialize)]
struct PostgrestErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// REST client for one table of the backing Postgres database.
pub struct PostgrestStore {
    client: reqwest::Client,
    endpoint: Url,
    service_key: String,
    table: String,
}

impl PostgrestStore {
    pub fn new(credentials: &BackendCredentials) -> Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/rest/v1/{}",
            credentials.url, credentials.table
        ))
        .map_err(|e| AppError::ConfigurationError(format!("Invalid SUPABASE_URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(credentials.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            service_key: credentials.service_key.clone(),
            table: credentials.table.clone(),
        })
    }

    fn url_with(&self, params: &[(&str, String)]) -> Url {
        let mut url = self.endpoint.clone();
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            error!(table = %self.table, operation, error = %e, "Backend request failed");
            AppError::persistence(format!("Request failed: {}", e), None)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = decode_error(status, &body);
        error!(
            table = %self.table,
            operation,
            status = status.as_u16(),
            code = err.code().unwrap_or("-"),
            error = %err,
            "Backend rejected request"
        );
        Err(err)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| AppError::persistence(format!("Failed to parse backend response: {}", e), None))
    }
}

/// Turn a non-2xx response into a persistence error, keeping the backend's
/// own code. Bodies that are not JSON fall back to the raw text and status.
fn decode_error(status: StatusCode, body: &str) -> AppError {
    let parsed: PostgrestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("Backend returned HTTP {}", status)
            } else {
                body.trim().to_string()
            }
        });

    AppError::PersistenceError {
        message,
        code: parsed.code.or_else(|| Some(status.as_u16().to_string())),
        details: parsed.details,
        hint: parsed.hint,
    }
}

/// Union of the keys present across an insert payload, in canonical column
/// order. Missing keys are filled by the backend with the column default.
fn insert_columns(payload: &[Value]) -> String {
    let present = |column: &str| {
        payload
            .iter()
            .any(|row| row.as_object().map_or(false, |map| map.contains_key(column)))
    };
    CurriculumField::ALL
        .iter()
        .map(|field| field.column())
        .filter(|column| present(column))
        .collect::<Vec<_>>()
        .join(",")
}

/// Total from a `Content-Range` header such as `0-0/57` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

/// `in.(...)` filter value; text ids are quoted so commas survive.
fn in_filter(ids: &[RecordId]) -> String {
    let values: Vec<String> = ids
        .iter()
        .map(|id| match id {
            RecordId::Int(value) => value.to_string(),
            RecordId::Text(value) => format!("\"{}\"", value.replace('"', "\\\"")),
        })
        .collect();
    format!("in.({})", values.join(","))
}

#[async_trait]
impl CurriculumStore for PostgrestStore {
    async fn insert_batch(&self, records: &[CurriculumOutcome]) -> Result<Vec<StoredOutcome>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let payload: Vec<Value> = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to encode outcomes: {}", e)))?;

        // Rows omit empty columns; the backend requires one key set per batch
        let url = self.url_with(&[("columns", insert_columns(&payload))]);
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&payload);
        let response = self.send("insert", request).await?;
        let stored: Vec<StoredOutcome> = Self::read_json(response).await?;

        debug!(table = %self.table, rows = stored.len(), "Inserted batch");
        Ok(stored)
    }

    async fn delete_by_ids(&self, ids: &[RecordId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let url = self.url_with(&[("id", in_filter(ids)), ("select", "id".to_string())]);
        let request = self
            .request(Method::DELETE, url)
            .header("Prefer", "return=representation");
        let response = self.send("delete", request).await?;
        let deleted: Vec<Value> = Self::read_json(response).await?;

        debug!(table = %self.table, rows = deleted.len(), "Deleted rows");
        Ok(deleted.len())
    }

    async fn count(&self) -> Result<u64> {
        let url = self.url_with(&[("select", "id".to_string()), ("limit", "1".to_string())]);
        let request = self.request(Method::GET, url).header("Prefer", "count=exact");
        let response = self.send("count", request).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| {
                AppError::persistence("Backend response carried no Content-Range total", None)
            })
    }

    async fn facets(&self) -> Result<Vec<OutcomeFacet>> {
        let mut facets = Vec::new();
        let mut offset = 0usize;

        loop {
            let url = self.url_with(&[
                ("select", "learning_area,level".to_string()),
                ("order", "id.asc".to_string()),
                ("limit", FACET_PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ]);
            let response = self.send("facets", self.request(Method::GET, url)).await?;
            let page: Vec<OutcomeFacet> = Self::read_json(response).await?;
            let page_len = page.len();
            facets.extend(page);

            if page_len < FACET_PAGE_SIZE {
                break;
            }
            offset += page_len;
        }

        Ok(facets)
    }

    async fn search(&self, filter: &OutcomeFilter) -> Result<Vec<StoredOutcome>> {
        let mut params = vec![("select", "*".to_string())];
        if let Some(learning_area) = &filter.learning_area {
            params.push(("learning_area", format!("eq.{}", learning_area)));
        }
        if let Some(level) = &filter.level {
            params.push(("level", format!("eq.{}", level)));
        }
        params.push(("order", "id.asc".to_string()));
        params.push(("limit", filter.limit.to_string()));

        let response = self
            .send("search", self.request(Method::GET, self.url_with(&params)))
            .await?;
        Self::read_json(response).await
    }

    async fn first_row(&self) -> Result<Option<Map<String, Value>>> {
        let url = self.url_with(&[("select", "*".to_string()), ("limit", "1".to_string())]);
        let response = self.send("first_row", self.request(Method::GET, url)).await?;
        let mut rows: Vec<Map<String, Value>> = Self::read_json(response).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    fn target(&self) -> &str {
        &self.table
    }
}
