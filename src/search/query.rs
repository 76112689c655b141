//! Query builder - turns a validated request into an engine query / 查询构建
//!
//! The query always has the same three clauses:
//! - `must`: one multi-field full-text match, weighted by [`FieldBoosts`]
//! - `must_not`: out-of-stock products
//! - `filter`: the price range, which does not affect scoring

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::SearchRequest;

const FIELD_NAME: &str = "name";
const FIELD_CATEGORY: &str = "category";
const FIELD_DESCRIPTION: &str = "description";
const FIELD_PRICE: &str = "price";
const FIELD_STOCK: &str = "stock";

/// Full-text field weights / 字段权重
///
/// A ranking policy, tunable from config. `name` must outrank the others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBoosts {
    pub name: f32,
    pub category: f32,
    pub description: f32,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            name: 3.0,
            category: 2.0,
            description: 2.0,
        }
    }
}

impl FieldBoosts {
    /// Check that boosts are positive and keep `name` on top.
    pub fn validate(&self) -> Result<(), String> {
        for (field, boost) in self.weighted() {
            if !boost.is_finite() || boost <= 0.0 {
                return Err(format!("boost for '{}' must be a positive number, got {}", field, boost));
            }
        }
        if self.name <= self.category || self.name <= self.description {
            return Err(format!(
                "name boost ({}) must be greater than category ({}) and description ({})",
                self.name, self.category, self.description
            ));
        }
        Ok(())
    }

    /// Engine field list, e.g. `["name^3", "category^2", "description^2"]`.
    pub fn fields(&self) -> Vec<String> {
        self.weighted()
            .into_iter()
            .map(|(field, boost)| format!("{}^{}", field, boost))
            .collect()
    }

    fn weighted(&self) -> [(&'static str, f32); 3] {
        [
            (FIELD_NAME, self.name),
            (FIELD_CATEGORY, self.category),
            (FIELD_DESCRIPTION, self.description),
        ]
    }
}

/// Engine query document. Built here, read only by the engine client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EngineQuery(Value);

impl EngineQuery {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Build the engine query for a request that has already been through
/// [`SearchRequest::validate`]. Never fails.
pub fn build_query(request: &SearchRequest, boosts: &FieldBoosts) -> EngineQuery {
    let filters = &request.filters;

    EngineQuery(json!({
        "query": {
            "bool": {
                "must": [
                    {
                        "multi_match": {
                            "query": request.search_for,
                            "fields": boosts.fields(),
                        }
                    }
                ],
                "must_not": [
                    { "term": { FIELD_STOCK: 0 } }
                ],
                "filter": [
                    {
                        "range": {
                            FIELD_PRICE: {
                                "gte": filters.price_bottom,
                                "lte": filters.price_top,
                            }
                        }
                    }
                ]
            }
        }
    }))
}
