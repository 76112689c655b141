//! Canned engine documents and configs.

use std::time::Duration;

use serde_json::{json, Value};
use simplesearch_backend::engine::EngineConfig;

pub fn product_source(name: &str, price: f64) -> Value {
    json!({
        "id": 1,
        "name": name,
        "description": format!("{} description", name),
        "price": price,
        "category": "tools",
        "stock": 5,
        "created_at": "2024-05-01T10:00:00Z"
    })
}

/// Engine `_search` envelope around the given sources, in order.
pub fn search_body(sources: &[Value]) -> Value {
    let hits: Vec<Value> = sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            json!({
                "_index": "products",
                "_id": i.to_string(),
                "_score": 10.0 - i as f64,
                "_source": source
            })
        })
        .collect();

    json!({
        "took": 3,
        "timed_out": false,
        "_shards": { "total": 1, "successful": 1, "skipped": 0, "failed": 0 },
        "hits": {
            "total": { "value": hits.len(), "relation": "eq" },
            "max_score": 10.0,
            "hits": hits
        }
    })
}

pub fn engine_config(base_url: &str) -> EngineConfig {
    EngineConfig {
        address: base_url.to_string(),
        username: "elastic".to_string(),
        password: "changeme".to_string(),
        request_timeout: Duration::from_secs(5),
        verify_on_startup: false,
        ..EngineConfig::default()
    }
}
