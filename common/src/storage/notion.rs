use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{
    store::{RecordStore, StoreError},
    types::{block::Block, filter::Filter, property::Properties, ParentRef, StoredRecord},
};
use crate::utils::config::AppConfig;

const NOTION_VERSION_HEADER: &str = "Notion-Version";

/// Record store backed by the Notion data-source API.
#[derive(Clone)]
pub struct NotionStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    results: Vec<StoredRecord>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl NotionStore {
    pub fn new(api_key: &str, base_url: &str, version: &str) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            NOTION_VERSION_HEADER,
            HeaderValue::from_str(version)
                .map_err(|e| StoreError::Decode(format!("invalid Notion version header: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        Self::new(
            &config.notion_api_key,
            &config.notion_base_url,
            &config.notion_version,
        )
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, StoreError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let raw = response.text().await.unwrap_or_default();
        Err(StoreError::from_status(status.as_u16(), error_message(&raw)))
    }
}

fn error_message(raw: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(raw).map_or_else(|_| raw.to_string(), |body| body.message)
}

fn query_body(filter: &Filter, cursor: Option<&str>) -> Value {
    let mut body = json!({ "filter": filter });
    if let (Some(cursor), Some(map)) = (cursor, body.as_object_mut()) {
        map.insert("start_cursor".into(), Value::String(cursor.to_string()));
    }
    body
}

fn create_body(parent: &ParentRef, properties: &Properties, children: &[Block]) -> Value {
    let mut body = json!({
        "parent": parent,
        "properties": properties,
    });
    if let (false, Some(map)) = (children.is_empty(), body.as_object_mut()) {
        map.insert("children".into(), json!(children));
    }
    body
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn query(
        &self,
        data_source_id: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let path = format!("data_sources/{data_source_id}/query");
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let response = self
                .post(&path, &query_body(filter, cursor.as_deref()))
                .await?;
            let page: QueryPage = serde_json::from_value(response)
                .map_err(|e| StoreError::Decode(format!("query response: {e}")))?;

            records.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => {
                    debug!(data_source_id, cursor = %next, "fetching next query page");
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(records)
    }

    async fn create_record(
        &self,
        parent: &ParentRef,
        properties: &Properties,
        children: &[Block],
    ) -> Result<StoredRecord, StoreError> {
        let response = self
            .post("pages", &create_body(parent, properties, children))
            .await?;

        serde_json::from_value(response)
            .map_err(|e| StoreError::Decode(format!("create response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::property::PropertyValue;

    #[test]
    fn query_body_carries_cursor_only_when_paging() {
        let filter = Filter::title_equals("Name", "Rust");

        let first = query_body(&filter, None);
        assert!(first.get("start_cursor").is_none());
        assert_eq!(first["filter"]["title"]["equals"], "Rust");

        let next = query_body(&filter, Some("cursor-2"));
        assert_eq!(next["start_cursor"], "cursor-2");
    }

    #[test]
    fn create_body_targets_data_source_and_omits_empty_children() {
        let parent = ParentRef::data_source("entities-db");
        let properties = Properties::new().with("Name", PropertyValue::Title("Ada".into()));

        let body = create_body(&parent, &properties, &[]);
        assert_eq!(
            body["parent"],
            json!({ "type": "data_source_id", "data_source_id": "entities-db" })
        );
        assert!(body.get("children").is_none());

        let with_children = create_body(&parent, &properties, &[Block::markdown("# Summary")]);
        assert_eq!(with_children["children"][0]["type"], "code");
        assert_eq!(with_children["children"][0]["code"]["language"], "markdown");
        assert_eq!(
            with_children["children"][0]["code"]["rich_text"][0]["text"]["content"],
            "# Summary"
        );
    }

    #[test]
    fn error_message_prefers_api_message() {
        let raw = r#"{"object":"error","status":400,"code":"validation_error","message":"Start Date is not a valid date"}"#;
        assert_eq!(error_message(raw), "Start Date is not a valid date");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn created_page_decodes_into_stored_record() {
        let page = json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "properties": { "Name": { "title": [] } }
        });

        let record: StoredRecord = serde_json::from_value(page).expect("decodes");
        assert_eq!(record.id, "59833787-2cf9-4fdf-8782-e53db20768a5");
    }
}
