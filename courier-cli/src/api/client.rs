//! HTTP record store client
//!
//! Talks to the dashboard's backend-as-a-service over its REST collection
//! API (`/api/collections/{collection}/records`). Every call is a single
//! request; there are no retries and no timeouts beyond reqwest defaults.

use async_trait::async_trait;
use log::debug;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::models::{Session, StoredRecord};
use super::query::{Filter, ListQuery};
use super::store::{RecordStore, StoreError, StoreResult};

/// Page size used when draining a full listing
const LIST_PAGE_SIZE: u32 = 500;

#[derive(Debug, Deserialize)]
struct ListPage {
    page: u32,
    #[serde(rename = "totalPages")]
    total_pages: u32,
    items: Vec<StoredRecord>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn records_url(&self, collection: &str) -> String {
        format!(
            "{}/api/collections/{}/records",
            self.base_url,
            urlencoding::encode(collection)
        )
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.records_url(collection), urlencoding::encode(id))
    }

    fn request(&self, method: Method, url: &str, session: &Session) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match session.token.as_deref() {
            Some(token) if !token.is_empty() => builder.header("Authorization", token),
            _ => builder,
        }
    }

    async fn list_page(
        &self,
        session: &Session,
        collection: &str,
        query: &ListQuery,
        page: u32,
        per_page: u32,
    ) -> StoreResult<ListPage> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
        ];
        if let Some(filter) = query.filter_string() {
            params.push(("filter", filter));
        }
        if let Some(sort) = query.sort_string() {
            params.push(("sort", sort));
        }
        if let Some(fields) = query.fields_string() {
            params.push(("fields", fields));
        }

        let url = self.records_url(collection);
        debug!("GET {} page={} filter={:?}", url, page, query.filter_string());
        let response = send(self.request(Method::GET, &url, session).query(&params)).await?;
        decode(response).await
    }
}

/// Send a request and map transport and status failures to `StoreError`
pub(crate) async fn send(builder: RequestBuilder) -> StoreResult<Response> {
    let response = builder
        .send()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

/// Map a non-success status and its body to a `StoreError`
fn status_error(status: StatusCode, body: &str) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized,
        StatusCode::NOT_FOUND => StoreError::NotFound,
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| body.to_string());
            StoreError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
    }
}

pub(crate) async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> StoreResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn create(
        &self,
        session: &Session,
        collection: &str,
        data: &Map<String, Value>,
    ) -> StoreResult<String> {
        let url = self.records_url(collection);
        debug!("POST {}", url);
        let response = send(self.request(Method::POST, &url, session).json(data)).await?;
        let created: StoredRecord = decode(response).await?;
        Ok(created.id)
    }

    async fn update_by_id(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> StoreResult<()> {
        let url = self.record_url(collection, id);
        debug!("PATCH {}", url);
        send(self.request(Method::PATCH, &url, session).json(data)).await?;
        Ok(())
    }

    async fn delete_by_id(&self, session: &Session, collection: &str, id: &str) -> StoreResult<()> {
        let url = self.record_url(collection, id);
        debug!("DELETE {}", url);
        send(self.request(Method::DELETE, &url, session)).await?;
        Ok(())
    }

    async fn list_full(
        &self,
        session: &Session,
        collection: &str,
        query: &ListQuery,
    ) -> StoreResult<Vec<StoredRecord>> {
        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .list_page(session, collection, query, page, LIST_PAGE_SIZE)
                .await?;
            records.extend(batch.items);
            if batch.page >= batch.total_pages {
                break;
            }
            page += 1;
        }
        Ok(records)
    }

    async fn get_first(
        &self,
        session: &Session,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<StoredRecord> {
        let query = ListQuery::new().filter(filter.clone());
        let batch = self.list_page(session, collection, &query, 1, 1).await?;
        batch.items.into_iter().next().ok_or(StoreError::NotFound)
    }
}
