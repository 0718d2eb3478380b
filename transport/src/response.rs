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
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode, Version};

/// Status line and headers of a response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// Response status.
    pub status: StatusCode,
    /// HTTP version the peer answered with.
    pub version: Version,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ResponseHead {
    /// Create a head with the given status, HTTP/1.1 and no headers.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
        }
    }
}

/// A fully received response.
///
/// The body distinguishes a peer that sent no body frames at all (`None`)
/// from one that sent an empty body.
#[derive(Debug, Clone)]
pub struct InboundResponse {
    head: ResponseHead,
    body: Option<Bytes>,
}

impl InboundResponse {
    /// Create a new response.
    pub fn new(head: ResponseHead, body: Option<Bytes>) -> Self {
        Self { head, body }
    }

    /// Status line and headers.
    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Body bytes, empty when no body was received.
    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Whether the peer sent any body frame.
    pub fn body_received(&self) -> bool {
        self.body.is_some()
    }

    /// Value of the first `content-type` header.
    ///
    /// Header names are matched case-insensitively; values that are not
    /// visible ASCII are ignored.
    pub fn content_type(&self) -> Option<&str> {
        self.head
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Consume the response and return its body.
    pub fn into_body(self) -> Option<Bytes> {
        self.body
    }
}

impl From<InboundResponse> for http::Response<Bytes> {
    fn from(resp: InboundResponse) -> Self {
        let mut out = http::Response::new(resp.body.unwrap_or_default());
        *out.status_mut() = resp.head.status;
        *out.version_mut() = resp.head.version;
        *out.headers_mut() = resp.head.headers;
        out
    }
}
