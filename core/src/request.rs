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

use std::mem;
use std::str::FromStr;
use std::time::Duration;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
///
/// Query pairs are kept exactly as they appear in the uri; signers decide
/// how to decode and re-encode them.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, still percent encoded.
    pub path: String,
    /// HTTP query parameters, still percent encoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri);
        let raw = uri.to_string();
        let uri = uri.into_parts();

        let scheme = uri.scheme.ok_or_else(|| {
            Error::malformed_url("request without scheme is invalid for signing")
                .with_context(format!("url: {raw}"))
        })?;
        let authority = uri
            .authority
            .filter(|a| !a.host().is_empty())
            .ok_or_else(|| {
                Error::malformed_url("request without host is invalid for signing")
                    .with_context(format!("url: {raw}"))
            })?;
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        let path = if paq.path().is_empty() {
            "/".to_string()
        } else {
            paq.path().to_string()
        };

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme,
            authority,
            path,
            query: paq.query().map(split_query).unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if self.query.is_empty() {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + 2 * self.query.len());

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.push_str(k);
                        if !v.is_empty() {
                            s.push('=');
                            s.push_str(v);
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }
}

/// Split a raw query string into `(name, value)` pairs without decoding.
///
/// `a=1&b&c=` becomes `[("a", "1"), ("b", ""), ("c", "")]`. Empty segments
/// produced by stray `&` are skipped.
fn split_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|s| match s.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (s.to_string(), String::new()),
        })
        .collect()
}

/// SigningMethod is the method that used in signing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signing with header.
    Header,
    /// Signing with query, the signature stays valid for the given duration.
    Query(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::get(uri)
            .header("x-custom", "value")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[test]
    fn test_build_keeps_raw_query() -> Result<()> {
        let mut p = parts("https://example.com/foo%20bar?b=a%2Fb&a+b=c+d&flag");
        let req = SigningRequest::build(&mut p)?;

        assert_eq!(req.path, "/foo%20bar");
        assert_eq!(
            req.query,
            vec![
                ("b".to_string(), "a%2Fb".to_string()),
                ("a+b".to_string(), "c+d".to_string()),
                ("flag".to_string(), "".to_string()),
            ]
        );
        assert_eq!(req.headers.get("x-custom").map(|v| v.as_bytes()), Some(&b"value"[..]));
        assert!(p.headers.is_empty());
        Ok(())
    }

    #[test]
    fn test_apply_restores_request() -> Result<()> {
        let mut p = parts("http://127.0.0.1:9000/bucket?list-type=2");
        let mut req = SigningRequest::build(&mut p)?;
        req.query_push("X-Amz-Expires", "60");
        req.apply(&mut p)?;

        assert_eq!(
            p.uri.to_string(),
            "http://127.0.0.1:9000/bucket?list-type=2&X-Amz-Expires=60"
        );
        assert_eq!(p.headers.get("x-custom").map(|v| v.as_bytes()), Some(&b"value"[..]));
        Ok(())
    }

    #[test]
    fn test_build_rejects_relative_uri() {
        let mut p = parts("/only/path");
        let err = SigningRequest::build(&mut p).expect_err("relative uri must fail");
        assert_eq!(err.kind(), ErrorKind::MalformedUrl);
    }
}
