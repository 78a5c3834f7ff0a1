//! Content store access
//!
//! The store is consumed through a single query operation: a GROQ string
//! plus named parameters in, JSON matching the projection out.

mod client;
pub mod queries;

pub use client::SanityClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::StoreError;

/// Named query parameters (`$name` in the query text)
pub type QueryParams = BTreeMap<String, Value>;

/// Request/response query interface of a headless content store
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run a query and return the raw `result` value
    async fn fetch(&self, query: &str, params: &QueryParams) -> Result<Value, StoreError>;
}

/// Run a query and decode the result into `T`
pub async fn fetch_as<T, S>(store: &S, query: &str, params: &QueryParams) -> Result<T, StoreError>
where
    T: DeserializeOwned,
    S: ContentStore + ?Sized,
{
    let value = store.fetch(query, params).await?;
    Ok(serde_json::from_value(value)?)
}
