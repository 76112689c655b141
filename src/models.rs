//! Search request and product record types / 搜索请求与商品记录类型
//!
//! `SearchRequest` is what clients post, `ProductRecord` is what the engine
//! stores under `_source` and what the API hands back, field for field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Effective price ceiling used when the client omits both bounds / 默认价格上限
pub const DEFAULT_PRICE_CEILING: f64 = 10_000_000.0;

/// Price range filter / 价格过滤
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub price_bottom: f64,
    #[serde(default)]
    pub price_top: f64,
}

impl Filters {
    pub fn new(price_bottom: f64, price_top: f64) -> Self {
        Self { price_bottom, price_top }
    }

    /// Replace an omitted range (both bounds zero) with `[0, DEFAULT_PRICE_CEILING]`.
    ///
    /// Any other range is returned untouched, so applying this twice is a no-op.
    pub fn normalized(self) -> Self {
        if self.price_bottom == 0.0 && self.price_top == 0.0 {
            Self::new(0.0, DEFAULT_PRICE_CEILING)
        } else {
            self
        }
    }
}

/// Inbound search request / 搜索请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub search_for: String,
    #[serde(default)]
    pub filters: Filters,
}

/// Request rejected before it reaches the engine / 请求校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("you must provide the desired search")]
    EmptySearch,

    #[error("price filters must be finite and not negative")]
    InvalidPrice,

    #[error("price_bottom must not be greater than price_top")]
    InvertedRange,
}

impl SearchRequest {
    pub fn new(search_for: impl Into<String>, filters: Filters) -> Self {
        Self {
            search_for: search_for.into(),
            filters,
        }
    }

    /// Validate and normalize the request / 校验并规范化请求
    ///
    /// This is the only place the price default is applied; the query builder
    /// takes the result as-is.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.search_for.trim().is_empty() {
            return Err(ValidationError::EmptySearch);
        }

        let Filters { price_bottom, price_top } = self.filters;
        let valid = |p: f64| p.is_finite() && p >= 0.0;
        if !valid(price_bottom) || !valid(price_top) {
            return Err(ValidationError::InvalidPrice);
        }

        let filters = self.filters.normalized();
        if filters.price_bottom > filters.price_top {
            return Err(ValidationError::InvertedRange);
        }

        Ok(Self {
            search_for: self.search_for,
            filters,
        })
    }
}

/// A product as indexed in the `products` collection / 商品记录
///
/// Missing or `null` fields decode to their zero value; a field of the wrong
/// JSON type fails the decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stock: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
