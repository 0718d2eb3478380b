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

use bytes::Bytes;
use cirrus_aws_v4::{Credential, RequestSigner};
use cirrus_core::utils::host_header;
use cirrus_core::{Context, Error, ProvideCredential, Result, Signer, SigningMethod};
use cirrus_transport::{
    EventLoopGroup, HttpClient, InboundResponse, OutboundRequest, PendingResponse,
};
use http::header::{ACCEPT, CONNECTION};
use http::{HeaderMap, HeaderValue, Method, Uri};
use log::debug;

use crate::config::check_presign_expires;
use crate::{Body, Config};

/// Client signs requests with AWS SigV4 and sends them over its own
/// connections.
///
/// ## Example
///
/// ```no_run
/// use cirrus::{Body, Client, Config, EventLoopGroup, StaticCredentialProvider};
/// use http::{HeaderMap, Method};
///
/// # async fn example() -> cirrus::Result<()> {
/// let group = EventLoopGroup::new(0)?;
/// let client = Client::new(
///     Config::new("iam"),
///     &group,
///     StaticCredentialProvider::new("access_key_id", "secret_access_key"),
/// )?;
///
/// let req = Client::request(
///     Method::GET,
///     "https://iam.amazonaws.com/?Action=ListUsers&Version=2010-05-08".parse()?,
///     HeaderMap::new(),
///     Body::Empty,
/// )?;
/// let resp = client.call(req).await?;
/// println!("{}", resp.status());
///
/// group.shutdown().await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    http: HttpClient,
    signer: Signer<Credential>,
}

impl Client {
    /// Create a client whose calls run on `group` and whose credentials
    /// come from `provider`.
    ///
    /// Credential refreshes that need the network, like the instance
    /// metadata service, go through the same transport.
    pub fn new(
        config: Config,
        group: &EventLoopGroup,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build(group)?;
        let ctx = Context::new().with_http_send(http.clone());
        let signer = Signer::new(
            ctx,
            provider,
            RequestSigner::new(&config.service, &config.region),
        );

        Ok(Self {
            config,
            http,
            signer,
        })
    }

    /// Seed the client with a credential so the first call does not need
    /// a refresh.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.signer = self.signer.with_credential(credential);
        self
    }

    /// Config of this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a request from its parts.
    pub fn request(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Body,
    ) -> Result<OutboundRequest> {
        let mut req = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(body.as_bytes().unwrap_or_default())?;
        *req.headers_mut() = headers;
        Ok(req)
    }

    /// Sign `req` and start sending it.
    ///
    /// The credential is refreshed first when it is missing or about to
    /// expire. A failed refresh aborts the call with `CredentialRefresh`
    /// and nothing is sent.
    pub async fn send(&self, req: OutboundRequest) -> Result<PendingResponse> {
        let (mut parts, body) = req.into_parts();
        host_header(&parts.uri)?;
        if !matches!(parts.uri.scheme_str(), Some("http") | Some("https")) {
            return Err(Error::malformed_url("unsupported url scheme")
                .with_context(format!("url: {}", parts.uri)));
        }

        // The transport always sends these values, sign the same.
        parts.headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        parts
            .headers
            .insert(CONNECTION, HeaderValue::from_static("close"));
        self.signer
            .sign(&mut parts, &body, SigningMethod::Header)
            .await?;

        debug!("sending signed request {} {}", parts.method, parts.uri);
        self.http.execute(http::Request::from_parts(parts, body))
    }

    /// Sign and send `req`, then wait for the full response.
    pub async fn call(&self, req: OutboundRequest) -> Result<InboundResponse> {
        self.send(req).await?.await
    }

    /// Build a presigned url valid for the configured `presign_expires`.
    pub async fn signed_url(&self, method: Method, uri: Uri) -> Result<Uri> {
        self.signed_url_with_expires(method, uri, self.config.presign_expires)
            .await
    }

    /// Build a presigned url valid for `expires`.
    pub async fn signed_url_with_expires(
        &self,
        method: Method,
        uri: Uri,
        expires: Duration,
    ) -> Result<Uri> {
        check_presign_expires(expires)?;

        let mut parts = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())?
            .into_parts()
            .0;
        self.signer
            .sign(&mut parts, &[], SigningMethod::Query(expires))
            .await?;

        Ok(parts.uri)
    }
}
