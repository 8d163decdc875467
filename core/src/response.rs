//! Normalized success responses.
//!
//! # Design
//! A decoded body is either an object or an array, so `Body` is a tagged
//! variant rather than a value probed at runtime. Callers pick the accessor
//! matching what they asked for (`to_dict` for a single resource, `to_list`
//! for a listing); the wrong one fails with `ErrorKind::ShapeMismatch`.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind};

/// Header carrying the total number of results of a paginated listing.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

static NULL: Value = Value::Null;

/// The decoded JSON body of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Object(Map<String, Value>),
    Array(Vec<Value>),
    /// Any other JSON value. The API never sends one, but it is valid JSON.
    Scalar(Value),
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Body::Object(map),
            Value::Array(items) => Body::Array(items),
            other => Body::Scalar(other),
        }
    }
}

impl From<Body> for Value {
    fn from(body: Body) -> Self {
        match body {
            Body::Object(map) => Value::Object(map),
            Body::Array(items) => Value::Array(items),
            Body::Scalar(value) => value,
        }
    }
}

/// Response headers plus values derived from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    headers: HashMap<String, String>,
    total_count: Option<i64>,
}

impl Meta {
    /// Header names are looked up exactly as the transport delivered them.
    pub fn new(headers: HashMap<String, String>) -> Self {
        let total_count = headers.get(TOTAL_COUNT_HEADER).and_then(|raw| {
            match raw.trim().parse::<i64>() {
                Ok(n) => Some(n),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring unparsable {TOTAL_COUNT_HEADER} header");
                    None
                }
            }
        });
        Self {
            headers,
            total_count,
        }
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Present only when the response carried a numeric `x-total-count`.
    pub fn total_count(&self) -> Option<i64> {
        self.total_count
    }
}

/// A decoded JSON success body with its [`Meta`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    body: Body,
    meta: Meta,
}

impl Response {
    pub fn new(value: Value, meta: Meta) -> Self {
        Self {
            body: Body::from(value),
            meta,
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn into_value(self) -> Value {
        self.body.into()
    }

    pub fn into_parts(self) -> (Value, Meta) {
        (self.body.into(), self.meta)
    }

    /// Entries of an object, elements of an array, 0 for a scalar.
    pub fn len(&self) -> usize {
        match &self.body {
            Body::Object(map) => map.len(),
            Body::Array(items) => items.len(),
            Body::Scalar(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match &self.body {
            Body::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match &mut self.body {
            Body::Object(map) => map.get_mut(key),
            _ => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match &self.body {
            Body::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Set `key` on an object body, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<Option<Value>, Error> {
        match &mut self.body {
            Body::Object(map) => Ok(map.insert(key.into(), value)),
            _ => Err(not_dict()),
        }
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, Error> {
        match &mut self.body {
            Body::Object(map) => Ok(map.remove(key)),
            _ => Err(not_dict()),
        }
    }

    /// Replace the element at `index` of an array body, returning the old one.
    pub fn set_index(&mut self, index: usize, value: Value) -> Result<Value, Error> {
        match &mut self.body {
            Body::Array(items) => match items.get_mut(index) {
                Some(slot) => Ok(std::mem::replace(slot, value)),
                None => Err(out_of_range(index, items.len())),
            },
            _ => Err(not_list()),
        }
    }

    pub fn remove_index(&mut self, index: usize) -> Result<Value, Error> {
        match &mut self.body {
            Body::Array(items) if index < items.len() => Ok(items.remove(index)),
            Body::Array(items) => Err(out_of_range(index, items.len())),
            _ => Err(not_list()),
        }
    }

    pub fn push(&mut self, value: Value) -> Result<(), Error> {
        match &mut self.body {
            Body::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(not_list()),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        matches!(&self.body, Body::Object(map) if map.contains_key(key))
    }

    /// Membership test: object keys for objects, elements for arrays.
    pub fn contains(&self, item: &Value) -> bool {
        match &self.body {
            Body::Object(map) => item.as_str().is_some_and(|key| map.contains_key(key)),
            Body::Array(items) => items.contains(item),
            Body::Scalar(_) => false,
        }
    }

    /// Object keys in order; empty for arrays and scalars.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let map = match &self.body {
            Body::Object(map) => Some(map),
            _ => None,
        };
        map.into_iter().flat_map(|m| m.keys().map(String::as_str))
    }

    /// Object values in key order, or array elements.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match &self.body {
            Body::Object(map) => Box::new(map.values()),
            Body::Array(items) => Box::new(items.iter()),
            Body::Scalar(_) => Box::new(std::iter::empty()),
        }
    }

    /// A copy of the object body.
    pub fn to_dict(&self) -> Result<Map<String, Value>, Error> {
        match &self.body {
            Body::Object(map) => Ok(map.clone()),
            _ => Err(not_dict()),
        }
    }

    /// A copy of the array body.
    pub fn to_list(&self) -> Result<Vec<Value>, Error> {
        match &self.body {
            Body::Array(items) => Ok(items.clone()),
            _ => Err(not_list()),
        }
    }
}

fn not_dict() -> Error {
    Error::new(ErrorKind::ShapeMismatch, "Response is not a dict-like object")
}

fn not_list() -> Error {
    Error::new(ErrorKind::ShapeMismatch, "Response is not a list-like object")
}

fn out_of_range(index: usize, len: usize) -> Error {
    Error::new(
        ErrorKind::ShapeMismatch,
        format!("index {index} out of range for list of length {len}"),
    )
}

impl Index<&str> for Response {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Response {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.get_index(index).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a Response {
    type Item = &'a Value;
    type IntoIter = Box<dyn Iterator<Item = &'a Value> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match &self.body {
            Body::Object(map) => serde_json::to_string(map),
            Body::Array(items) => serde_json::to_string(items),
            Body::Scalar(value) => serde_json::to_string(value),
        };
        f.write_str(&value.map_err(|_| fmt::Error)?)
    }
}
