use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use nhelper_core::{
    CoreError, DocumentPublisher, PublishedDocument, RawRecord, RecordFilter, RecordSource,
};
use nhelper_domain::{Block, PropertyValue};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    encode::{encode_blocks, encode_filter, encode_properties},
    NotionError,
};

/// Page size for database queries and batch size for block children.
pub const MAX_BATCH: usize = 100;

const VERSION_HEADER: &str = "Notion-Version";

/// Connection settings for [`NotionClient`].
#[derive(Debug, Clone)]
pub struct NotionClientSettings {
    pub token: String,
    pub base_url: String,
    pub version: String,
    pub timeout: Duration,
}

impl Default for NotionClientSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: "https://api.notion.com".into(),
            version: "2022-06-28".into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the workspace API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    results: Vec<RawRecord>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl NotionClient {
    pub fn new(settings: NotionClientSettings) -> Result<Self, NotionError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.token))
            .map_err(|err| NotionError::Decode(format!("invalid token header: {err}")))?;
        headers.insert(AUTHORIZATION, bearer);
        let version = HeaderValue::from_str(&settings.version)
            .map_err(|err| NotionError::Decode(format!("invalid version header: {err}")))?;
        headers.insert(VERSION_HEADER, version);

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// All records of a database matching `filter`, following pagination.
    pub async fn query_database(
        &self,
        database_id: &str,
        filter: Option<Value>,
    ) -> Result<Vec<RawRecord>, NotionError> {
        let path = format!("/v1/databases/{database_id}/query");
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": MAX_BATCH });
            if let Some(filter) = &filter {
                body["filter"] = filter.clone();
            }
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }
            let page: QueryPage = self.send(self.request(Method::POST, &path).json(&body)).await?;
            records.extend(page.results);
            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }
        debug!(database_id, count = records.len(), "queried database");
        Ok(records)
    }

    /// Creates a page in `database_id`. Children beyond the first batch are
    /// appended afterwards in batches of [`MAX_BATCH`].
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Value,
        children: Vec<Value>,
    ) -> Result<PublishedDocument, NotionError> {
        let mut batches = children.chunks(MAX_BATCH);
        let first: Vec<Value> = batches.next().map(<[Value]>::to_vec).unwrap_or_default();
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
            "children": first,
        });
        let created: CreatedPage = self
            .send(self.request(Method::POST, "/v1/pages").json(&body))
            .await?;

        for batch in batches {
            self.append_children(&created.id, batch).await?;
        }
        debug!(page_id = %created.id, blocks = children.len(), "created page");
        Ok(PublishedDocument {
            id: created.id,
            url: created.url,
        })
    }

    pub async fn append_children(&self, block_id: &str, children: &[Value]) -> Result<(), NotionError> {
        let path = format!("/v1/blocks/{block_id}/children");
        let body = json!({ "children": children });
        let _: Value = self
            .send(self.request(Method::PATCH, &path).json(&body))
            .await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .headers(self.headers.clone())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, NotionError> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| NotionError::Decode(err.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, NotionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: ApiErrorBody = response.json().await.unwrap_or_default();
    Err(NotionError::Api {
        status: status.as_u16(),
        code: body.code,
        message: body.message,
    })
}

#[async_trait]
impl RecordSource for NotionClient {
    async fn query_records(
        &self,
        collection_id: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<RawRecord>, CoreError> {
        Ok(self
            .query_database(collection_id, filter.map(encode_filter))
            .await?)
    }
}

#[async_trait]
impl DocumentPublisher for NotionClient {
    async fn create_document(
        &self,
        collection_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
        blocks: &[Block],
    ) -> Result<PublishedDocument, CoreError> {
        Ok(self
            .create_page(
                collection_id,
                encode_properties(properties),
                encode_blocks(blocks),
            )
            .await?)
    }
}
