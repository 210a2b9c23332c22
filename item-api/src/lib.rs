//! Wire contract of the downstream item service.
pub mod drain;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http_body_util::Full;
use serde::{Deserialize, Deserializer};

pub const ITEM_PATH: &str = "/item";
pub const ONLY_ONE_CLIENT_PATH: &str = "/item/onlyoneclient";
pub const CREATE_CLIENT_EVERY_TIME_RETRY_PATH: &str = "/item/createclienteverytimeretry";

/// Fixed content carried by every create request.
pub const HELLO_CLIENT: &str = "hello client";

#[inline]
pub fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}

#[inline]
pub fn byte_body<B: Into<Bytes>>(bytes: B) -> Full<Bytes> {
    Full::new(bytes.into())
}

/// `POST /item` body where lot and index travel inside the contents list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemContentsRequest {
    #[serde(rename = "Contents")]
    pub contents: Vec<String>,
}

impl ItemContentsRequest {
    #[must_use]
    pub fn new(lot: &str, index: usize) -> Self {
        Self {
            contents: vec![lot.to_owned(), index.to_string(), HELLO_CLIENT.to_owned()],
        }
    }
}

/// Create body with lot and index as their own fields.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LotItemRequest {
    pub lot: String,
    pub index: usize,
    pub contents: Vec<String>,
}

impl LotItemRequest {
    #[must_use]
    pub fn new(lot: &str, index: usize) -> Self {
        Self {
            lot: lot.to_owned(),
            index,
            contents: vec![HELLO_CLIENT.to_owned()],
        }
    }
}

/// Body returned by the create endpoints. The service does not pin the
/// casing of its field names, so both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[serde(alias = "Key", deserialize_with = "non_empty")]
    pub key: String,
    #[serde(default, alias = "Contents")]
    pub contents: Vec<String>,
    #[serde(default, alias = "CreatedAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "UpdatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let key = String::deserialize(deserializer)?;
    if key.is_empty() {
        return Err(serde::de::Error::custom("key must not be empty"));
    }
    Ok(key)
}

/// Key of a created item. Sent as the `PUT` body and as the `GET` query.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemKey {
    pub key: String,
}

impl ItemKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// `key=<percent-encoded key>`
    pub fn to_query(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self)
    }
}
