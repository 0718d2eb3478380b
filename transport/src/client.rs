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

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cirrus_core::utils::host_header;
use cirrus_core::{Error, HttpSend, Result};
use http::header::{ACCEPT, CONNECTION, CONTENT_LENGTH, HOST, USER_AGENT};
use http::{HeaderMap, HeaderValue};
use log::debug;

use crate::event_loop::{EventLoopGroup, EventLoopHandle};
use crate::handler::{ResponseHandler, ResponsePart};
use crate::promise::{self, PendingResponse};
use crate::{InboundResponse, ResponseHead};

/// A request ready to be sent.
pub type OutboundRequest = http::Request<Bytes>;

/// Default `User-Agent` sent by the client.
pub const DEFAULT_USER_AGENT: &str = concat!("cirrus/", env!("CARGO_PKG_VERSION"));

/// Builder for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    connect_timeout: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientBuilder {
    /// Set the connect timeout, 5 seconds by default.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the `User-Agent` sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build a client that runs its calls on `group`.
    pub fn build(self, group: &EventLoopGroup) -> Result<HttpClient> {
        let user_agent = HeaderValue::try_from(self.user_agent)?;

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(0)
            .connect_timeout(self.connect_timeout)
            .tcp_nodelay(true)
            .http1_only()
            .http1_title_case_headers()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| Error::transport("failed to build http client").with_source(e))?;

        Ok(HttpClient {
            client,
            handle: group.handle()?,
            user_agent,
        })
    }
}

/// HTTP/1.1 client that opens one connection per call.
///
/// ## Example
///
/// ```no_run
/// use bytes::Bytes;
/// use cirrus_transport::{EventLoopGroup, HttpClient};
///
/// # async fn example() -> cirrus_core::Result<()> {
/// let group = EventLoopGroup::new(0)?;
/// let client = HttpClient::new(&group)?;
///
/// let req = http::Request::get("http://127.0.0.1:9000/health").body(Bytes::new())?;
/// let resp = client.execute(req)?.await?;
/// println!("{}", resp.status());
///
/// group.shutdown().await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    handle: EventLoopHandle,
    user_agent: HeaderValue,
}

impl HttpClient {
    /// Create a client with default settings.
    pub fn new(group: &EventLoopGroup) -> Result<Self> {
        HttpClientBuilder::default().build(group)
    }

    /// Create a builder.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Start a call and return its pending response.
    ///
    /// The url is checked before anything is dispatched: a url without
    /// scheme or host fails here with `MalformedUrl`. Connection and
    /// parsing failures surface through the pending response.
    pub fn execute(&self, req: OutboundRequest) -> Result<PendingResponse> {
        let (mut parts, body) = req.into_parts();

        let host = host_header(&parts.uri)?;
        match parts.uri.scheme_str() {
            Some("http") | Some("https") => {}
            _ => {
                return Err(Error::malformed_url("unsupported url scheme")
                    .with_context(format!("url: {}", parts.uri)))
            }
        }
        self.frame_headers(&mut parts.headers, &host, body.len())?;

        debug!("dispatching {} {}", parts.method, parts.uri);
        let req = reqwest::Request::try_from(http::Request::from_parts(parts, body))
            .map_err(|e| Error::malformed_url("url is not supported").with_source(e))?;

        let (promise, pending) = promise::channel();
        let client = self.client.clone();
        self.handle.spawn(async move {
            let mut handler = ResponseHandler::new(promise);
            drive(&client, req, &mut handler).await;
        })?;

        Ok(pending)
    }

    /// Send a request and wait for the full response.
    pub async fn call(&self, req: OutboundRequest) -> Result<InboundResponse> {
        self.execute(req)?.await
    }

    fn frame_headers(&self, headers: &mut HeaderMap, host: &str, len: usize) -> Result<()> {
        headers.insert(HOST, HeaderValue::try_from(host)?);
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        Ok(())
    }
}

#[async_trait]
impl HttpSend for HttpClient {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Ok(self.call(req).await?.into())
    }
}

/// Run one call and feed what the connection yields into `handler`.
async fn drive(client: &reqwest::Client, req: reqwest::Request, handler: &mut ResponseHandler) {
    let url = req.url().clone();

    let mut resp = match client.execute(req).await {
        Ok(resp) => resp,
        Err(err) => {
            handler.fail(transport_error(err).with_context(format!("url: {url}")));
            return;
        }
    };

    handler.handle(ResponsePart::Head(ResponseHead {
        status: resp.status(),
        version: resp.version(),
        headers: std::mem::take(resp.headers_mut()),
    }));

    while !handler.is_complete() {
        match resp.chunk().await {
            Ok(Some(chunk)) => handler.handle(ResponsePart::Body(chunk)),
            Ok(None) => handler.handle(ResponsePart::End),
            Err(err) => handler.fail(transport_error(err).with_context(format!("url: {url}"))),
        }
    }
    debug!("call to {url} finished");
}

fn transport_error(err: reqwest::Error) -> Error {
    let message = if err.is_connect() {
        "failed to connect"
    } else if err.is_timeout() {
        "connection timed out"
    } else if err.is_body() || err.is_decode() {
        "failed to read response body"
    } else {
        "request failed"
    };
    let retryable = err.is_connect() || err.is_timeout();

    Error::transport(message)
        .with_source(err)
        .set_retryable(retryable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::ErrorKind;
    use test_case::test_case;

    #[test_case("/relative/path"; "no scheme")]
    #[test_case("ftp://example.com/file"; "unsupported scheme")]
    fn test_execute_rejects_malformed_url(url: &str) {
        let group = EventLoopGroup::new(1).expect("group must start");
        let client = HttpClient::new(&group).expect("client must build");

        let req = http::Request::get(url)
            .body(Bytes::new())
            .expect("request must build");
        let err = client.execute(req).expect_err("url must be rejected");
        assert_eq!(err.kind(), ErrorKind::MalformedUrl);
    }

    #[test]
    fn test_frame_headers_overwrites_caller_values() {
        let group = EventLoopGroup::new(1).expect("group must start");
        let client = HttpClient::builder()
            .user_agent("cirrus-test")
            .build(&group)
            .expect("client must build");

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("999"));
        headers.insert("x-amz-date", HeaderValue::from_static("20150830T123600Z"));

        client
            .frame_headers(&mut headers, "127.0.0.1:9000", 3)
            .expect("headers must frame");

        assert_eq!(headers[HOST], "127.0.0.1:9000");
        assert_eq!(headers[USER_AGENT], "cirrus-test");
        assert_eq!(headers[ACCEPT], "*/*");
        assert_eq!(headers[CONTENT_LENGTH], "3");
        assert_eq!(headers[CONNECTION], "close");
        assert_eq!(headers["x-amz-date"], "20150830T123600Z");
    }

    #[test]
    fn test_build_rejects_invalid_user_agent() {
        let group = EventLoopGroup::new(1).expect("group must start");
        let err = HttpClient::builder()
            .user_agent("bad\nagent")
            .build(&group)
            .expect_err("user agent must be rejected");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }
}
