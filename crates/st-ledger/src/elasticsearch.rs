//! Elasticsearch-compatible ledger implementation
//!
//! The ledger is a dedicated index holding one document per script execution.
//! Script payloads are sent to the `_bulk` endpoint as-is.

use crate::error::{LedgerError, LedgerResult};
use crate::traits::{LedgerClient, PayloadOutcome};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use st_core::{Execution, ExecutionRecord, StoreConfig};
use std::time::Duration;

/// Ledger stored in an index of an Elasticsearch-compatible cluster
pub struct ElasticsearchLedger {
    client: Client,
    base_url: String,
    index: String,
    health_timeout: String,
    credentials: Option<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: Execution,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    #[serde(default)]
    timed_out: bool,
}

impl ElasticsearchLedger {
    /// Build a client for the configured store
    pub fn new(config: &StoreConfig) -> LedgerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| LedgerError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            index: config.index.clone(),
            health_timeout: config.health_timeout.clone(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
        })
    }

    /// Name of the ledger index
    pub fn index(&self) -> &str {
        &self.index
    }

    fn index_url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.index, suffix)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    /// Send a request and read the full body regardless of status
    async fn send(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> LedgerResult<(StatusCode, String)> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| LedgerError::transport(operation, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::transport(operation, e))?;
        log::debug!("{}, status: {}", operation, status.as_u16());
        Ok((status, body))
    }

    /// Send a request that must answer with a 2xx status
    async fn send_ok(&self, operation: &str, builder: RequestBuilder) -> LedgerResult<String> {
        let (status, body) = self.send(operation, builder).await?;
        if !status.is_success() {
            return Err(LedgerError::UnexpectedStatus {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn search(&self, operation: &str, query: Value) -> LedgerResult<Vec<ExecutionRecord>> {
        let request = self.client.post(self.index_url("/_search")).json(&query);
        let body = self.send_ok(operation, request).await?;
        decode_records(operation, &body)
    }
}

/// Index definition for the ledger collection
pub(crate) fn ledger_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "fileName": { "type": "keyword" },
                "checksum": { "type": "keyword" },
                "executedAt": {
                    "type": "date",
                    "format": "strict_date_hour_minute_second_millis"
                },
                "succeeded": { "type": "boolean" }
            }
        }
    })
}

/// Ascending insertion order: execution time, then name for equal timestamps.
/// Name order is only a stable tie-break; callers re-align ties themselves.
pub(crate) fn ordered_query(size: u64) -> Value {
    json!({
        "size": size,
        "query": { "match_all": {} },
        "sort": [
            { "executedAt": { "order": "asc" } },
            { "fileName": { "order": "asc" } }
        ]
    })
}

pub(crate) fn latest_query() -> Value {
    json!({
        "size": 1,
        "query": { "match_all": {} },
        "sort": [
            { "executedAt": { "order": "desc" } },
            { "fileName": { "order": "desc" } }
        ]
    })
}

pub(crate) fn failed_query(size: u64) -> Value {
    json!({
        "size": size,
        "query": { "term": { "succeeded": false } },
        "sort": [ { "executedAt": { "order": "asc" } } ]
    })
}

pub(crate) fn by_name_query(file_name: &str) -> Value {
    json!({
        "size": 1,
        "query": { "term": { "fileName": file_name } }
    })
}

/// Decode search hits into typed records
pub(crate) fn decode_records(operation: &str, body: &str) -> LedgerResult<Vec<ExecutionRecord>> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| LedgerError::decode(operation, e))?;
    Ok(response
        .hits
        .hits
        .into_iter()
        .map(|hit| hit.source.with_id(hit.id))
        .collect())
}

/// Interpret the answer to `HEAD /{index}`
pub(crate) fn exists_from_status(status: StatusCode, body: String) -> LedgerResult<bool> {
    match status {
        StatusCode::OK => Ok(true),
        StatusCode::NOT_FOUND => Ok(false),
        other => Err(LedgerError::UnexpectedStatus {
            operation: "index exists".to_string(),
            status: other.as_u16(),
            body,
        }),
    }
}

/// Interpret the answer to the index creation request. An index created by a
/// concurrent run counts as created.
pub(crate) fn check_created(status: StatusCode, body: String) -> LedgerResult<()> {
    let already_exists =
        status == StatusCode::BAD_REQUEST && body.contains("resource_already_exists_exception");
    if status.is_success() || already_exists {
        return Ok(());
    }
    Err(LedgerError::UnexpectedStatus {
        operation: "create index".to_string(),
        status: status.as_u16(),
        body,
    })
}

/// The collection is usable once the cluster reports at least yellow
pub(crate) fn check_health(
    index: &str,
    timeout: &str,
    status: StatusCode,
    body: &str,
) -> LedgerResult<()> {
    let health: HealthResponse = match serde_json::from_str(body) {
        Ok(health) => health,
        Err(_) if !status.is_success() => {
            return Err(LedgerError::Unhealthy {
                index: index.to_string(),
                message: format!("status {}: {}", status.as_u16(), body),
            });
        }
        Err(e) => return Err(LedgerError::decode("cluster health", e)),
    };
    if !status.is_success() || health.timed_out {
        return Err(LedgerError::Unhealthy {
            index: index.to_string(),
            message: format!("status '{}' after {}", health.status, timeout),
        });
    }
    Ok(())
}

/// Bulk bodies must end with a newline
pub(crate) fn bulk_body(payload: &[u8]) -> Vec<u8> {
    let mut body = payload.to_vec();
    if !body.ends_with(b"\n") {
        body.push(b'\n');
    }
    body
}

#[async_trait]
impl LedgerClient for ElasticsearchLedger {
    async fn collection_exists(&self) -> LedgerResult<bool> {
        let request = self.client.head(self.index_url(""));
        let (status, body) = self.send("index exists", request).await?;
        exists_from_status(status, body)
    }

    async fn create_collection(&self) -> LedgerResult<()> {
        let request = self.client.put(self.index_url("")).json(&ledger_mapping());
        let (status, body) = self.send("create index", request).await?;
        check_created(status, body)?;

        let health_url = format!(
            "{}/_cluster/health/{}?wait_for_status=yellow&timeout={}",
            self.base_url, self.index, self.health_timeout
        );
        let (status, body) = self
            .send("cluster health", self.client.get(health_url))
            .await?;
        check_health(&self.index, &self.health_timeout, status, &body)
    }

    async fn count(&self) -> LedgerResult<u64> {
        let body = self
            .send_ok("count", self.client.get(self.index_url("/_count")))
            .await?;
        let response: CountResponse =
            serde_json::from_str(&body).map_err(|e| LedgerError::decode("count", e))?;
        Ok(response.count)
    }

    async fn list_ordered(&self) -> LedgerResult<Vec<ExecutionRecord>> {
        let size = self.count().await?;
        if size == 0 {
            return Ok(Vec::new());
        }
        self.search("list scripts", ordered_query(size)).await
    }

    async fn find_failed(&self) -> LedgerResult<Vec<ExecutionRecord>> {
        let size = self.count().await?;
        if size == 0 {
            return Ok(Vec::new());
        }
        self.search("list failed scripts", failed_query(size)).await
    }

    async fn latest(&self) -> LedgerResult<Option<ExecutionRecord>> {
        Ok(self
            .search("latest script", latest_query())
            .await?
            .into_iter()
            .next())
    }

    async fn find_by_name(&self, file_name: &str) -> LedgerResult<Option<ExecutionRecord>> {
        Ok(self
            .search("search script", by_name_query(file_name))
            .await?
            .into_iter()
            .next())
    }

    async fn insert(&self, execution: &Execution) -> LedgerResult<String> {
        let request = self
            .client
            .post(self.index_url("/_doc?refresh=true"))
            .json(execution);
        let body = self.send_ok("index script", request).await?;
        let response: IndexResponse =
            serde_json::from_str(&body).map_err(|e| LedgerError::decode("index script", e))?;
        Ok(response.id)
    }

    async fn update(&self, id: &str, execution: &Execution) -> LedgerResult<()> {
        let request = self
            .client
            .put(self.index_url(&format!("/_doc/{}?refresh=true", id)))
            .json(execution);
        self.send_ok("update script", request).await?;
        Ok(())
    }

    async fn apply_payload(&self, payload: &[u8]) -> LedgerResult<PayloadOutcome> {
        let request = self
            .client
            .post(format!("{}/_bulk?refresh=true", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(bulk_body(payload));
        let (status, body) = self.send("bulk", request).await?;
        log::debug!("bulk, result: {}", body);
        Ok(PayloadOutcome {
            succeeded: status.is_success(),
            diagnostics: body,
        })
    }

    fn backend(&self) -> &'static str {
        "elasticsearch"
    }
}

#[cfg(test)]
#[path = "elasticsearch_test.rs"]
mod tests;
