use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ContentList {
    pub content_type: String,
    pub version: String,
    pub checksum_sha256: String,
    pub items: Vec<Value>,
}
