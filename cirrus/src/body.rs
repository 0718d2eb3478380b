// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;
use cirrus_core::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Payload of a request.
///
/// Structured payloads are encoded by the caller; the client only sends
/// bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Buffer(Bytes),
    /// An encoded JSON document.
    Json(Bytes),
    /// No payload.
    #[default]
    Empty,
}

impl Body {
    /// Encode `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let bs = serde_json::to_vec(value)
            .map_err(|e| Error::request_invalid("failed to encode json body").with_source(e))?;
        Ok(Body::Json(bs.into()))
    }

    /// Bytes to send, `None` when there is nothing to send.
    ///
    /// An empty JSON document counts as nothing to send.
    pub fn as_bytes(&self) -> Option<Bytes> {
        match self {
            Body::Text(text) => Some(Bytes::copy_from_slice(text.as_bytes())),
            Body::Buffer(bs) => Some(bs.clone()),
            Body::Json(bs) if bs.is_empty() => None,
            Body::Json(bs) => Some(bs.clone()),
            Body::Empty => None,
        }
    }

    /// Whether this is a JSON body.
    pub fn is_json(&self) -> bool {
        matches!(self, Body::Json(_))
    }

    /// Whether this is a raw byte body.
    pub fn is_buffer(&self) -> bool {
        matches!(self, Body::Buffer(_))
    }

    /// Decode a JSON body into an object.
    ///
    /// Returns `None` for non-JSON bodies and for JSON that is not an object.
    pub fn json_object(&self) -> Result<Option<Map<String, Value>>> {
        let Body::Json(bs) = self else {
            return Ok(None);
        };

        let value: Value = serde_json::from_slice(bs)
            .map_err(|e| Error::unexpected("failed to decode json body").with_source(e))?;
        match value {
            Value::Object(map) => Ok(Some(map)),
            _ => Ok(None),
        }
    }
}

impl From<String> for Body {
    fn from(v: String) -> Self {
        Body::Text(v)
    }
}

impl From<&str> for Body {
    fn from(v: &str) -> Self {
        Body::Text(v.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(v: Bytes) -> Self {
        Body::Buffer(v)
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Buffer(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Body::Text("hello".into()), Some(b"hello".as_slice()); "text")]
    #[test_case(Body::Text(String::new()), Some(b"".as_slice()); "empty text")]
    #[test_case(Body::Buffer(Bytes::from_static(b"\x00\x01")), Some(b"\x00\x01".as_slice()); "buffer")]
    #[test_case(Body::Json(Bytes::from_static(b"{}")), Some(b"{}".as_slice()); "json")]
    #[test_case(Body::Json(Bytes::new()), None; "empty json")]
    #[test_case(Body::Empty, None; "empty")]
    fn test_as_bytes(body: Body, expected: Option<&[u8]>) {
        assert_eq!(body.as_bytes().as_deref(), expected);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(Body::Json(Bytes::new()).is_json());
        assert!(!Body::Json(Bytes::new()).is_buffer());
        assert!(Body::from(vec![1u8, 2]).is_buffer());
        assert!(!Body::from("text").is_json());
    }

    #[test]
    fn test_json_object() -> Result<()> {
        let body = Body::json(&serde_json::json!({"Action": "ListUsers"}))?;
        let map = body.json_object()?.expect("body is an object");
        assert_eq!(map["Action"], "ListUsers");

        assert_eq!(Body::Json(Bytes::from_static(b"[1]")).json_object()?, None);
        assert_eq!(Body::from("{}").json_object()?, None);
        assert!(Body::Json(Bytes::from_static(b"{")).json_object().is_err());
        Ok(())
    }
}
