use crate::error::ApiError;
use crate::traits::WantedApi;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use wanted_config::ServerConfig;
use wanted_models::{
    AssignOutcome, BulkPushResult, ExternalSource, LookupCandidate, MergeCommitGroup, MergePreview,
    PushMode, PushOptions, PushStatus, RecordId, Service, ServiceOptions, WantedContent,
};

#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    status: Option<PushStatus>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    deleted: Value,
}

#[derive(Debug, Deserialize)]
struct MergeCommitResponse {
    #[serde(default)]
    merged: usize,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    items: Vec<LookupCandidate>,
}

/// `reqwest`-backed client for the wanted list endpoints
#[derive(Clone)]
pub struct HttpWantedApi {
    client: Client,
    base_url: String,
}

impl HttpWantedApi {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-requested-with"),
                    reqwest::header::HeaderValue::from_static("XMLHttpRequest"),
                );
                headers
            })
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        self.send(self.client.get(self.url(path))).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ApiError> {
        debug!("POST {}", path);
        self.send(self.client.post(self.url(path)).json(body)).await
    }
}

/// Classify a raw response: non-2xx and `ok: false` bodies are failures,
/// anything else must deserialize into `T`.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let value: Value = if body.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) if status.is_success() => {
                return Err(ApiError::Parse(format!("invalid JSON body: {}", e)));
            }
            Err(_) => Value::Null,
        }
    };

    let error_code = value
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);

    if !status.is_success() {
        let message = error_code.unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("request failed").to_string()
        });
        warn!("Request failed with status {}: {}", status.as_u16(), message);
        return Err(ApiError::Api { status: status.as_u16(), message });
    }

    if value.get("ok").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Rejected(error_code.unwrap_or_else(|| "rejected".to_string())));
    }

    serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}

fn deleted_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_u64().unwrap_or(0) > 0,
        _ => false,
    }
}

#[async_trait]
impl WantedApi for HttpWantedApi {
    async fn fetch_content(&self) -> Result<WantedContent, ApiError> {
        self.get("/api/wanted/content").await
    }

    async fn assign_external(
        &self,
        id: &RecordId,
        source: ExternalSource,
        external_id: &str,
        link: Option<&str>,
    ) -> Result<AssignOutcome, ApiError> {
        let body = json!({
            "source": source.as_str(),
            "external_id": external_id,
            "link": link,
        });
        self.post_json(&format!("/api/wanted/{}/external", id), &body).await
    }

    async fn lookup(
        &self,
        id: &RecordId,
        source: ExternalSource,
        query: Option<&str>,
    ) -> Result<Vec<LookupCandidate>, ApiError> {
        let path = format!("/api/wanted/{}/lookup/{}", id, source.as_str());
        debug!("GET {}", path);
        let mut request = self.client.get(self.url(&path));
        if let Some(q) = query.filter(|q| !q.trim().is_empty()) {
            request = request.query(&[("q", q)]);
        }
        let response: LookupResponse = self.send(request).await?;
        Ok(response.items)
    }

    async fn push(
        &self,
        service: Service,
        mode: PushMode,
        id: &RecordId,
        options: &PushOptions,
    ) -> Result<PushStatus, ApiError> {
        let path = format!("/api/wanted/{}/{}/{}", id, service.as_str(), mode.as_str());
        let body = serde_json::to_value(options).map_err(|e| ApiError::Parse(e.to_string()))?;
        let response: PushResponse = self.post_json(&path, &body).await?;
        Ok(response.status.unwrap_or(match mode {
            PushMode::Add => PushStatus::Added,
            PushMode::Update => PushStatus::Updated,
        }))
    }

    async fn bulk_push(
        &self,
        service: Service,
        mode: PushMode,
        ids: &[RecordId],
        options: &PushOptions,
    ) -> Result<BulkPushResult, ApiError> {
        let path = format!("/api/wanted/{}/bulk_{}", service.as_str(), mode.as_str());
        let mut body = serde_json::to_value(options).map_err(|e| ApiError::Parse(e.to_string()))?;
        body["media_ids"] = json!(ids);
        self.post_json(&path, &body).await
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, ApiError> {
        let path = format!("/wanted/{}/delete", id);
        debug!("POST {}", path);
        let response: DeleteResponse = self.send(self.client.post(self.url(&path))).await?;
        Ok(deleted_flag(&response.deleted))
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<usize, ApiError> {
        debug!("POST /wanted/bulk_delete ({} ids)", ids.len());
        let form: Vec<(&str, &str)> = ids.iter().map(|id| ("media_ids[]", id.as_str())).collect();
        let request = self.client.post(self.url("/wanted/bulk_delete")).form(&form);
        let response: DeleteResponse = self.send(request).await?;
        Ok(response.deleted.as_u64().unwrap_or(0) as usize)
    }

    async fn merge_preview(&self, ids: &[RecordId]) -> Result<MergePreview, ApiError> {
        self.post_json("/api/wanted/merge/preview", &json!({ "media_ids": ids })).await
    }

    async fn merge_commit(&self, groups: &[MergeCommitGroup]) -> Result<usize, ApiError> {
        let response: MergeCommitResponse = self
            .post_json("/api/wanted/merge/commit", &json!({ "groups": groups }))
            .await?;
        Ok(response.merged)
    }

    async fn service_options(&self, service: Service) -> Result<ServiceOptions, ApiError> {
        self.get(&format!("/api/{}/options", service.as_str())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success() {
        let result: BulkPushResult = decode_response(
            StatusCode::OK,
            r#"{"ok": true, "added": 1, "added_ids": [5]}"#,
        )
        .unwrap();
        assert_eq!(result.added_ids, vec![RecordId::from("5")]);
    }

    #[test]
    fn test_decode_error_status_uses_server_code() {
        let err = decode_response::<Value>(
            StatusCode::BAD_REQUEST,
            r#"{"ok": false, "error": "missing_tmdb"}"#,
        )
        .unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "missing_tmdb");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_error_status_with_html_body() {
        let err = decode_response::<Value>(StatusCode::INTERNAL_SERVER_ERROR, "<h1>boom</h1>").unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 500, .. }));
    }

    #[test]
    fn test_decode_ok_false_is_rejected() {
        let err = decode_response::<Value>(StatusCode::OK, r#"{"ok": false, "error": "no_selection"}"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref code) if code == "no_selection"));
        assert_eq!(err.code(), "no_selection");
    }

    #[test]
    fn test_decode_empty_body_defaults() {
        let response: DeleteResponse = decode_response(StatusCode::OK, "").unwrap();
        assert!(!deleted_flag(&response.deleted));
    }

    #[test]
    fn test_decode_invalid_json_on_success() {
        let err = decode_response::<Value>(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_deleted_flag_variants() {
        assert!(deleted_flag(&json!(true)));
        assert!(deleted_flag(&json!(1)));
        assert!(!deleted_flag(&json!(0)));
        assert!(!deleted_flag(&Value::Null));
    }

    #[test]
    fn test_client_trims_base_url() {
        let api = HttpWantedApi::new(&ServerConfig {
            base_url: "http://wanted.lan/".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(api.url("/api/wanted/content"), "http://wanted.lan/api/wanted/content");
    }
}
