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

use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use http::header::{AUTHORIZATION, HOST};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method, Uri};
use log::debug;

use cirrus_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use cirrus_core::time::{format_date, format_iso8601, now, DateTime};
use cirrus_core::utils::host_header;
use cirrus_core::{Context, Result, SignRequest, SigningMethod, SigningRequest};

use crate::constants::{
    ALGORITHM, S3_SERVICE, SCOPE_TERMINATOR, UNSIGNABLE_HEADERS, UNSIGNED_PAYLOAD,
    X_AMZ_ALGORITHM, X_AMZ_CONTENT_SHA_256, X_AMZ_CREDENTIAL, X_AMZ_DATE, X_AMZ_DATE_QUERY,
    X_AMZ_EXPIRES, X_AMZ_SECURITY_TOKEN, X_AMZ_SECURITY_TOKEN_QUERY, X_AMZ_SIGNATURE,
    X_AMZ_SIGNED_HEADERS,
};
use crate::encoding::{aws_uri_encode, canonical_query_string, canonical_uri, reencode};
use crate::Credential;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The signer is a pure function of the credential, the request and the
/// signing time; it never refreshes credentials on its own.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Service name used in the credential scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region used in the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Hex encoded SHA256 of the body.
    ///
    /// S3 accepts `UNSIGNED-PAYLOAD` for empty bodies and we use it there.
    pub fn payload_hash(&self, body: &[u8]) -> String {
        if body.is_empty() && self.service == S3_SERVICE {
            UNSIGNED_PAYLOAD.to_string()
        } else {
            hex_sha256(body)
        }
    }

    /// Credential scope: `20150830/us-east-1/iam/aws4_request`.
    pub fn scope(&self, time: DateTime) -> String {
        format!(
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            format_date(time),
            self.region,
            self.service
        )
    }

    /// Sign a request with the `Authorization` header.
    ///
    /// Returns the headers to transmit: the caller's headers plus `Host`,
    /// `x-amz-date`, `x-amz-content-sha256`, `x-amz-security-token` (only
    /// when the credential carries a token) and `Authorization`. Unsignable
    /// headers like `content-type` are kept but never signed.
    pub fn signed_headers(
        &self,
        cred: &Credential,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<HeaderMap> {
        let now = self.time.unwrap_or_else(now);
        let payload_hash = self.payload_hash(body);

        let mut signed = headers.clone();
        signed.remove(AUTHORIZATION);
        signed.insert(HOST, HeaderValue::try_from(host_header(uri)?)?);
        signed.insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);
        signed.insert(
            X_AMZ_CONTENT_SHA_256,
            HeaderValue::try_from(payload_hash.as_str())?,
        );
        if let Some(token) = cred.session_token() {
            let mut value = HeaderValue::try_from(token)?;
            // Set token value sensitive to avoid leaking.
            value.set_sensitive(true);
            signed.insert(X_AMZ_SECURITY_TOKEN, value);
        }

        let creq = canonical_request(method, uri, &signed, &payload_hash)?;
        let scope = self.scope(now);
        debug!("calculated scope: {scope}");
        let string_to_sign = string_to_sign(now, &scope, &creq);
        debug!("calculated string to sign: {string_to_sign}");

        let key = signing_key(cred.secret_access_key(), now, &self.region, &self.service);
        let signature = signature(&key, &string_to_sign);

        let mut authorization = HeaderValue::try_from(format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
            cred.access_key_id(),
            signed_header_names(&signed),
        ))?;
        authorization.set_sensitive(true);
        signed.insert(AUTHORIZATION, authorization);

        Ok(signed)
    }

    /// Build a presigned url that stays valid for `expires`.
    ///
    /// Only `host` is signed and the payload hash is taken over an empty
    /// body. The caller's query parameters are kept, re-encoded and sorted
    /// together with the `X-Amz-*` ones; `X-Amz-Signature` comes last.
    pub fn signed_url(
        &self,
        cred: &Credential,
        method: &Method,
        uri: &Uri,
        expires: Duration,
    ) -> Result<Uri> {
        let now = self.time.unwrap_or_else(now);
        let scope = self.scope(now);

        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::try_from(host_header(uri)?)?);

        let mut parts = http::Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .body(())?
            .into_parts()
            .0;
        let mut req = SigningRequest::build(&mut parts)?;

        let caller_query = std::mem::take(&mut req.query);
        req.query_push(X_AMZ_ALGORITHM, ALGORITHM);
        req.query_push(
            X_AMZ_CREDENTIAL,
            aws_uri_encode(&format!("{}/{scope}", cred.access_key_id()), true),
        );
        req.query_push(X_AMZ_DATE_QUERY, format_iso8601(now));
        req.query_push(X_AMZ_EXPIRES, expires.as_secs().to_string());
        req.query_push(X_AMZ_SIGNED_HEADERS, "host");
        if let Some(token) = cred.session_token() {
            req.query_push(X_AMZ_SECURITY_TOKEN_QUERY, aws_uri_encode(token, true));
        }
        for (k, v) in caller_query {
            req.query_push(reencode(&k, true), reencode(&v, true));
        }
        req.query.sort();
        req.apply(&mut parts)?;

        let creq = canonical_request(method, &parts.uri, &headers, &self.payload_hash(&[]))?;
        debug!("calculated scope: {scope}");
        let string_to_sign = string_to_sign(now, &scope, &creq);
        debug!("calculated string to sign: {string_to_sign}");

        let key = signing_key(cred.secret_access_key(), now, &self.region, &self.service);
        let signature = signature(&key, &string_to_sign);

        let mut req = SigningRequest::build(&mut parts)?;
        req.query_push(X_AMZ_SIGNATURE, signature);
        req.apply(&mut parts)?;

        Ok(parts.uri)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
        method: SigningMethod,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Ok(());
        };

        match method {
            SigningMethod::Header => {
                req.headers = self.signed_headers(cred, &req.method, &req.uri, &req.headers, body)?;
            }
            SigningMethod::Query(expires) => {
                req.uri = self.signed_url(cred, &req.method, &req.uri, expires)?;
            }
        }

        Ok(())
    }
}

/// Build the canonical request.
///
/// ```text
/// GET
/// /
/// Action=ListUsers&Version=2010-05-08
/// host:iam.amazonaws.com
/// x-amz-date:20150830T123600Z
///
/// host;x-amz-date
/// e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
/// ```
///
/// Every header in `headers` is signed except the unsignable ones.
pub fn canonical_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    payload_hash: &str,
) -> Result<String> {
    let canonical_headers = canonical_headers(headers)?;

    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);
    writeln!(f, "{method}")?;
    writeln!(f, "{}", canonical_uri(uri.path()))?;
    writeln!(f, "{}", canonical_query_string(uri.query().unwrap_or_default()))?;
    for (name, value) in &canonical_headers {
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(
        f,
        "{}",
        canonical_headers.keys().copied().collect::<Vec<_>>().join(";")
    )?;
    write!(f, "{payload_hash}")?;

    debug!("calculated canonical request: {f}");
    Ok(f)
}

/// `AWS4-HMAC-SHA256\n<timestamp>\n<scope>\n<hex(sha256(canonical_request))>`
pub fn string_to_sign(time: DateTime, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{}\n{scope}\n{}",
        format_iso8601(time),
        hex_sha256(canonical_request.as_bytes())
    )
}

/// Derive the signing key for one day, region and service.
pub fn signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), SCOPE_TERMINATOR.as_bytes())
}

/// Hex encoded HMAC of the string to sign.
pub fn signature(signing_key: &[u8], string_to_sign: &str) -> String {
    hex_hmac_sha256(signing_key, string_to_sign.as_bytes())
}

/// Lower-cased names of the headers that get signed, sorted and joined by `;`.
pub fn signed_header_names(headers: &HeaderMap) -> String {
    headers
        .keys()
        .map(|k| k.as_str())
        .filter(|k| is_signable(k))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(";")
}

fn is_signable(name: &str) -> bool {
    !UNSIGNABLE_HEADERS.contains(&name)
}

/// Sorted `name -> value` of the signable headers.
///
/// `http` already lower-cases header names. Values are trimmed with inner
/// runs of spaces collapsed, and repeated headers are joined with `,`.
fn canonical_headers(headers: &HeaderMap) -> Result<BTreeMap<&str, String>> {
    let mut canonical = BTreeMap::new();
    for name in headers.keys() {
        if !is_signable(name.as_str()) {
            continue;
        }

        let mut values = Vec::new();
        for value in headers.get_all(name) {
            values.push(normalize_header_value(value.to_str()?));
        }
        canonical.insert(name.as_str(), values.join(","));
    }
    Ok(canonical)
}

fn normalize_header_value(v: &str) -> String {
    v.trim()
        .split(' ')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
