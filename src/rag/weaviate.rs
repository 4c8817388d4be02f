use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::VectorStoreConfig;
use crate::errors::{RagChatError, RagChatResult};
use crate::rag::store::{RetrievedPassage, VectorStore};

/// HTTP client for a Weaviate instance, scoped to one collection.
pub struct WeaviateClient {
    base_url: String,
    collection: String,
    text_property: String,
    client: Option<reqwest::Client>,
}

impl WeaviateClient {
    /// Opens a connection: builds the HTTP client with the forwarded
    /// credential header and waits for the readiness probe to pass.
    pub async fn connect(cfg: &VectorStoreConfig, forwarded_key: &str) -> RagChatResult<Self> {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(cfg.api_key_header.as_bytes()).map_err(|e| {
            RagChatError::Config(format!("invalid header name '{}': {e}", cfg.api_key_header))
        })?;
        let mut value = HeaderValue::from_str(forwarded_key)
            .map_err(|e| RagChatError::Config(format!("invalid forwarded API key: {e}")))?;
        value.set_sensitive(true);
        headers.insert(name, value);

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        let base_url = cfg.url.trim_end_matches('/').to_string();

        let ready = client
            .get(format!("{base_url}/v1/.well-known/ready"))
            .send()
            .await?;
        if !ready.status().is_success() {
            return Err(RagChatError::VectorStore(format!(
                "{base_url} is not ready: {}",
                ready.status()
            )));
        }

        tracing::info!(url = %base_url, collection = %cfg.collection, "vector store connected");

        Ok(Self {
            base_url,
            collection: cfg.collection.clone(),
            text_property: cfg.text_property.clone(),
            client: Some(client),
        })
    }
}

#[async_trait]
impl VectorStore for WeaviateClient {
    fn name(&self) -> &str {
        &self.collection
    }

    async fn near_text(&self, query: &str, limit: usize) -> RagChatResult<Vec<RetrievedPassage>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RagChatError::VectorStore("connection closed".into()))?;

        let gql = build_near_text_query(&self.collection, &self.text_property, query, limit)?;
        tracing::debug!(collection = %self.collection, limit, "near-text query");

        let response = client
            .post(format!("{}/v1/graphql", self.base_url))
            .json(&serde_json::json!({ "query": gql }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(RagChatError::VectorStore(format!("{}: {}", status, err_body)));
        }

        let json: serde_json::Value = response.json().await?;
        let passages = parse_near_text_response(&json, &self.collection, &self.text_property)?;
        tracing::info!(collection = %self.collection, matches = passages.len(), "near-text results");
        Ok(passages)
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::info!(url = %self.base_url, "vector store connection closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

impl Drop for WeaviateClient {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builds the GraphQL `Get` query for a near-text search. The query text is
/// embedded as a JSON string literal, which is also a valid GraphQL string.
fn build_near_text_query(
    collection: &str,
    text_property: &str,
    query: &str,
    limit: usize,
) -> RagChatResult<String> {
    let concept = serde_json::to_string(query)?;
    Ok(format!(
        "{{ Get {{ {collection}(nearText: {{ concepts: [{concept}] }}, limit: {limit}) \
         {{ {text_property} _additional {{ certainty distance }} }} }} }}"
    ))
}

fn parse_near_text_response(
    json: &serde_json::Value,
    collection: &str,
    text_property: &str,
) -> RagChatResult<Vec<RetrievedPassage>> {
    if let Some(errors) = json["errors"].as_array() {
        if !errors.is_empty() {
            let messages: Vec<&str> = errors
                .iter()
                .map(|e| e["message"].as_str().unwrap_or("unknown error"))
                .collect();
            return Err(RagChatError::VectorStore(messages.join("; ")));
        }
    }

    let objects = json["data"]["Get"][collection]
        .as_array()
        .map(|arr| {
            arr.iter()
                .map(|obj| RetrievedPassage {
                    text: obj[text_property].as_str().unwrap_or("").to_string(),
                    certainty: obj["_additional"]["certainty"].as_f64(),
                    distance: obj["_additional"]["distance"].as_f64(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(objects)
}
