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

//! AWS SigV4 signing for cirrus.
//!
//! [`RequestSigner`] turns a request into either signed headers or a
//! presigned url, and the providers in this crate load the [`Credential`]
//! it signs with.
//!
//! ## Example
//!
//! ```no_run
//! use cirrus_aws_v4::{RequestSigner, StaticCredentialProvider};
//! use cirrus_core::{Context, Result, Signer, SigningMethod};
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(
//!     Context::new(),
//!     StaticCredentialProvider::new("access_key_id", "secret_access_key"),
//!     RequestSigner::new("s3", "us-east-1"),
//! );
//!
//! let (mut parts, body) = http::Request::get("https://bucket.s3.amazonaws.com/key")
//!     .body(Vec::new())?
//!     .into_parts();
//! signer.sign(&mut parts, &body, SigningMethod::Header).await?;
//! # Ok(())
//! # }
//! ```

mod constants;

mod credential;
pub use credential::Credential;

mod encoding;
pub use encoding::{aws_uri_encode, canonical_query_string, canonical_uri};

mod sign_request;
pub use sign_request::{
    canonical_request, signature, signed_header_names, signing_key, string_to_sign, RequestSigner,
};

mod provide_credential;
pub use provide_credential::*;

/// Payload hash used instead of a digest for empty S3 bodies.
pub use constants::UNSIGNED_PAYLOAD;
