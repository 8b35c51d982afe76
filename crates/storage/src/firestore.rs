//! Firestore REST adapter for the remote document store.
//!
//! Talks to the public `v1` REST surface with an API key. Firestore wraps
//! every field in a typed value (`{"stringValue": "Shoes"}`); this module
//! converts between that wire shape and plain JSON [`Fields`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::document::{Document, DocumentStore, Fields};
use crate::error::StoreError;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: &str = "300";

/// Connection settings for a Firestore project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: Option<String>,
    pub database: String,
    pub base_url: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            database: "(default)".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Root URL of the document tree.
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database
        )
    }
}

/// Remote document store backed by Firestore.
#[derive(Debug, Clone)]
pub struct FirestoreDocumentStore {
    client: reqwest::Client,
    config: FirestoreConfig,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(rename = "createTime")]
    create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<WireDocument>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<WireDocument>,
}

impl FirestoreDocumentStore {
    pub fn new(config: FirestoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let req = self.client.request(method, url);
        match &self.config.api_key {
            Some(key) => req.query(&[("key", key.as_str())]),
            None => req,
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.config.documents_url(), collection, id)
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        not_found: Option<(&str, &str)>,
    ) -> Result<reqwest::Response, StoreError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some((collection, id)) = not_found {
                return Err(StoreError::not_found(collection, id));
            }
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "firestore request failed");
        Err(StoreError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let url = format!("{}/{}", self.config.documents_url(), collection);
        let req = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({ "fields": encode_fields(&fields) }));
        let wire: WireDocument = self.send(req, None).await?.json().await?;
        decode_document(wire)
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}/{}", self.config.documents_url(), collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self
                .request(reqwest::Method::GET, &url)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let page: ListResponse = self.send(req, None).await?.json().await?;
            for wire in page.documents {
                documents.push(decode_document(wire)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(collection, count = documents.len(), "fetched collection");
        Ok(documents)
    }

    async fn fetch_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.config.documents_url());
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": encode_value(value),
                    }
                }
            }
        });
        let req = self.request(reqwest::Method::POST, &url).json(&body);
        let items: Vec<RunQueryItem> = self.send(req, None).await?.json().await?;

        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(decode_document)
            .collect()
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let mut params: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let req = self
            .request(reqwest::Method::PATCH, &url)
            .query(&params)
            .json(&json!({ "fields": encode_fields(&fields) }));
        self.send(req, Some((collection, id))).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let req = self
            .request(reqwest::Method::DELETE, &url)
            .query(&[("currentDocument.exists", "true")]);
        self.send(req, Some((collection, id))).await?;
        Ok(())
    }
}

/// Wrap plain JSON into a Firestore typed value.
pub(crate) fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub(crate) fn encode_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(encoded)
}

/// Unwrap a Firestore typed value into plain JSON.
pub(crate) fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::Parse(format!("typed value is not an object: {value}")))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::Parse("empty typed value".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "integerValue" => {
            let raw = inner.as_str().map(str::to_string).unwrap_or_else(|| inner.to_string());
            raw.parse::<i64>()
                .map(Value::from)
                .map_err(|e| StoreError::Parse(format!("integerValue {raw}: {e}")))
        }
        "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode_value).collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            Ok(Value::Object(match fields {
                Some(fields) => decode_fields(fields)?,
                None => Map::new(),
            }))
        }
        other => Err(StoreError::Parse(format!("unsupported value type {other}"))),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, StoreError> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

fn decode_document(wire: WireDocument) -> Result<Document, StoreError> {
    let id = wire
        .name
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StoreError::Parse(format!("document name without id: {}", wire.name)))?
        .to_string();

    Ok(Document {
        id,
        fields: decode_fields(&wire.fields)?,
        create_time: wire.create_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_url_includes_project_and_database() {
        let config = FirestoreConfig::new("store-app").with_api_key("k");
        assert_eq!(
            config.documents_url(),
            "https://firestore.googleapis.com/v1/projects/store-app/databases/(default)/documents"
        );
    }

    #[test]
    fn encodes_scalars_and_nested_values() {
        assert_eq!(encode_value(&json!("Shoes")), json!({"stringValue": "Shoes"}));
        assert_eq!(encode_value(&json!(3)), json!({"integerValue": "3"}));
        assert_eq!(encode_value(&json!(129.99)), json!({"doubleValue": 129.99}));
        assert_eq!(
            encode_value(&json!(["a"])),
            json!({"arrayValue": {"values": [{"stringValue": "a"}]}})
        );
        assert_eq!(
            encode_value(&json!({"x": null})),
            json!({"mapValue": {"fields": {"x": {"nullValue": null}}}})
        );
    }

    #[test]
    fn decoding_reverses_encoding() {
        let original = json!({
            "name": "Nike Air Max",
            "price": 129.99,
            "stock": 4,
            "tags": ["run", "air"],
            "meta": {"featured": true, "note": null}
        });
        let encoded = encode_value(&original);
        assert_eq!(decode_value(&encoded).unwrap(), original);
    }

    #[test]
    fn decodes_wire_documents() {
        let wire: WireDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/Categories/abc123",
            "fields": {
                "CatName": {"stringValue": "Shoes"},
                "createdAt": {"timestampValue": "2024-05-01T10:00:00Z"}
            },
            "createTime": "2024-05-01T10:00:00.123456Z"
        }))
        .unwrap();

        let doc = decode_document(wire).unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.field("CatName"), Some(&json!("Shoes")));
        assert!(doc.create_time.is_some());
    }

    #[test]
    fn empty_query_results_carry_no_document() {
        let items: Vec<RunQueryItem> =
            serde_json::from_value(json!([{"readTime": "2024-05-01T10:00:00Z"}])).unwrap();
        assert!(items[0].document.is_none());
    }

    #[test]
    fn unknown_value_types_are_parse_errors() {
        let err = decode_value(&json!({"mysteryValue": 1})).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }
}
