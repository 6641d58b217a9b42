//! # Query Selector
//!
//! Structured equality predicate over JSON documents, exchanged in the
//! `{"selector": {<field>: <value>}}` wire form.
//!
//! A condition is either a bare scalar (implicit equality) or `{"$eq": v}`.
//! Several fields combine with AND. An empty selector matches every document.

use crate::errors::StoreError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const SELECTOR: &str = "selector";
const EQ: &str = "$eq";

/// Declarative document predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySelector {
    conditions: BTreeMap<String, Value>,
}

impl QuerySelector {
    /// A selector matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"selector": {field: value}}`
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and_eq(field, value)
    }

    /// Add another equality condition.
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    /// Field/value pairs in field order.
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Parse the `{"selector": {...}}` wire form.
    pub fn parse(query: &str) -> Result<Self, StoreError> {
        let root: Value = serde_json::from_str(query)
            .map_err(|e| StoreError::InvalidQuery(format!("not valid JSON: {e}")))?;
        let selector = root
            .get(SELECTOR)
            .and_then(Value::as_object)
            .ok_or_else(|| StoreError::InvalidQuery("missing \"selector\" object".into()))?;

        let mut conditions = BTreeMap::new();
        for (field, condition) in selector {
            conditions.insert(field.clone(), parse_condition(field, condition)?);
        }
        Ok(Self { conditions })
    }

    /// Render the wire form. Values are JSON-escaped.
    pub fn to_query_string(&self) -> String {
        let fields: Map<String, Value> = self
            .conditions
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut root = Map::new();
        root.insert(SELECTOR.to_string(), Value::Object(fields));
        Value::Object(root).to_string()
    }

    /// True when `doc` is an object satisfying every condition.
    pub fn matches(&self, doc: &Value) -> bool {
        let Some(object) = doc.as_object() else {
            return false;
        };
        self.conditions
            .iter()
            .all(|(field, expected)| object.get(field) == Some(expected))
    }

    /// Like `matches`, for raw stored bytes. Non-JSON values never match.
    pub fn matches_bytes(&self, bytes: &[u8]) -> bool {
        serde_json::from_slice::<Value>(bytes)
            .map(|doc| self.matches(&doc))
            .unwrap_or(false)
    }
}

fn parse_condition(field: &str, condition: &Value) -> Result<Value, StoreError> {
    match condition {
        Value::Object(ops) => {
            if ops.len() != 1 {
                return Err(StoreError::InvalidQuery(format!(
                    "field {field}: expected a single operator"
                )));
            }
            match ops.get(EQ) {
                Some(v) if is_scalar(v) => Ok(v.clone()),
                Some(_) => Err(StoreError::InvalidQuery(format!(
                    "field {field}: $eq requires a scalar"
                ))),
                None => {
                    let op = ops.keys().next().map(String::as_str).unwrap_or_default();
                    Err(StoreError::InvalidQuery(format!(
                        "field {field}: unsupported operator {op}"
                    )))
                }
            }
        }
        Value::Array(_) => Err(StoreError::InvalidQuery(format!(
            "field {field}: array conditions are not supported"
        ))),
        scalar => Ok(scalar.clone()),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

impl fmt::Display for QuerySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl FromStr for QuerySelector {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
