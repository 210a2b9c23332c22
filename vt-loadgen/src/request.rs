//! One function per downstream endpoint. Each builds its payload, performs a
//! single exchange and logs the outcome.
use crate::client::Transport;
use crate::error::TaskError;
use crate::lot::Lot;
use crate::record::ResponseRecord;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request};
use item_api::{
    byte_body, empty_body, ItemContentsRequest, ItemKey, ItemResponse, LotItemRequest,
    CREATE_CLIENT_EVERY_TIME_RETRY_PATH, ITEM_PATH, ONLY_ONE_CLIENT_PATH,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The endpoint a request goes to, together with its method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Item,
    LotItem,
    OnlyOneClientCreate,
    OnlyOneClientUpdate,
    OnlyOneClientRead,
    CreateClientEveryTimeRetry,
}

impl Resource {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::LotItem => "lot-item",
            Self::OnlyOneClientCreate => "only-one-client/create",
            Self::OnlyOneClientUpdate => "only-one-client/update",
            Self::OnlyOneClientRead => "only-one-client/read",
            Self::CreateClientEveryTimeRetry => "create-client-every-time-retry",
        }
    }

    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::OnlyOneClientUpdate => Method::PUT,
            Self::OnlyOneClientRead => Method::GET,
            _ => Method::POST,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Item | Self::LotItem => ITEM_PATH,
            Self::OnlyOneClientCreate | Self::OnlyOneClientUpdate | Self::OnlyOneClientRead => {
                ONLY_ONE_CLIENT_PATH
            }
            Self::CreateClientEveryTimeRetry => CREATE_CLIENT_EVERY_TIME_RETRY_PATH,
        }
    }
}

/// A successful create together with the key the service generated.
#[derive(Debug, Clone)]
pub struct Created {
    pub record: ResponseRecord,
    pub key: String,
}

/// Issues requests against one item service.
#[derive(Clone)]
pub struct ItemClient {
    base_uri: Arc<str>,
    transport: Transport,
}

impl ItemClient {
    #[must_use]
    pub fn new(base_uri: impl Into<Arc<str>>, transport: Transport) -> Self {
        Self {
            base_uri: base_uri.into(),
            transport,
        }
    }

    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub async fn post_item(&self, lot: &Lot, index: usize) -> Result<ResponseRecord, TaskError> {
        let payload = ItemContentsRequest::new(lot.as_str(), index);
        let body = encode(Resource::Item, lot, index, &payload);
        self.exchange(Resource::Item, lot, index, payload.contents, Some(body), None)
            .await
    }

    pub async fn post_lot_item(
        &self,
        lot: &Lot,
        index: usize,
    ) -> Result<ResponseRecord, TaskError> {
        let payload = LotItemRequest::new(lot.as_str(), index);
        let body = encode(Resource::LotItem, lot, index, &payload);
        self.exchange(Resource::LotItem, lot, index, payload.contents, Some(body), None)
            .await
    }

    pub async fn post_only_one_client(&self, lot: &Lot, index: usize) -> Result<Created, TaskError> {
        let resource = Resource::OnlyOneClientCreate;
        let payload = LotItemRequest::new(lot.as_str(), index);
        let body = encode(resource, lot, index, &payload);
        let record = self
            .exchange(resource, lot, index, payload.contents, Some(body), None)
            .await?;
        let created: ItemResponse = serde_json::from_str(&record.body).map_err(|e| {
            tracing::error!(
                resource = resource.label(),
                lot = %lot,
                index,
                body = %record.body,
                error = %e,
                "create response has no key"
            );
            TaskError::Decode(e)
        })?;
        Ok(Created {
            key: created.key,
            record,
        })
    }

    pub async fn put_only_one_client(
        &self,
        lot: &Lot,
        index: usize,
        key: &str,
    ) -> Result<ResponseRecord, TaskError> {
        let resource = Resource::OnlyOneClientUpdate;
        let body = encode(resource, lot, index, &ItemKey::new(key));
        self.exchange(resource, lot, index, Vec::new(), Some(body), None)
            .await
    }

    pub async fn get_only_one_client(
        &self,
        lot: &Lot,
        index: usize,
        key: &str,
    ) -> Result<ResponseRecord, TaskError> {
        let resource = Resource::OnlyOneClientRead;
        let query = ItemKey::new(key).to_query().map_err(TaskError::Query)?;
        self.exchange(resource, lot, index, Vec::new(), None, Some(query))
            .await
    }

    pub async fn post_create_client_every_time_retry(
        &self,
        lot: &Lot,
        index: usize,
    ) -> Result<ResponseRecord, TaskError> {
        let resource = Resource::CreateClientEveryTimeRetry;
        let payload = LotItemRequest::new(lot.as_str(), index);
        let body = encode(resource, lot, index, &payload);
        self.exchange(resource, lot, index, payload.contents, Some(body), None)
            .await
    }

    async fn exchange(
        &self,
        resource: Resource,
        lot: &Lot,
        index: usize,
        contents: Vec<String>,
        body: Option<Vec<u8>>,
        query: Option<String>,
    ) -> Result<ResponseRecord, TaskError> {
        let uri = match query {
            Some(query) => format!("{}{}?{query}", self.base_uri, resource.path()),
            None => format!("{}{}", self.base_uri, resource.path()),
        };
        let mut builder = Request::builder().method(resource.method()).uri(&uri);
        let body = match body {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                byte_body(bytes)
            }
            None => empty_body(),
        };
        let request = builder
            .body(body)
            .map_err(|source| TaskError::Build { uri, source })?;

        let client = self.transport.client();
        let (rtt, resp) = run_timed(client.send_recv(request)).await;
        let resp = resp.inspect_err(|e| {
            tracing::error!(
                resource = resource.label(),
                lot = %lot,
                index,
                error = %e,
                "request failed"
            );
        })?;

        let record = ResponseRecord {
            resource,
            lot: lot.clone(),
            index,
            contents,
            status: resp.status,
            body: resp.body_text(),
            rtt,
        };
        record.log();
        record.into_result()
    }
}

/// Serializes a payload and logs it. A payload that fails to serialize is
/// logged and replaced by an empty body.
fn encode<T: Serialize>(resource: Resource, lot: &Lot, index: usize, payload: &T) -> Vec<u8> {
    match serde_json::to_vec(payload).map_err(TaskError::Marshal) {
        Ok(bytes) => {
            tracing::info!(
                resource = resource.label(),
                lot = %lot,
                index,
                payload = %String::from_utf8_lossy(&bytes),
                "sending request"
            );
            bytes
        }
        Err(e) => {
            tracing::error!(resource = resource.label(), lot = %lot, index, error = %e, "payload not serializable");
            Vec::new()
        }
    }
}

#[inline]
async fn run_timed<T, F: Future<Output = T>>(fut: F) -> (Duration, T) {
    let start = Instant::now();
    let res = fut.await;
    (start.elapsed(), res)
}
